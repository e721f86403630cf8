//! Admin API 追踪链接管理

use std::str::FromStr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{info, trace};

use crate::services::{AdminLinkQuery, CreateTrackerRequest, LinkService};
use crate::storage::LinkTarget;

use super::error_code::ErrorCode;
use super::helpers::{error_from_claroche, error_response, success_response};
use super::types::{
    AdminLinkResponse, GetLinksQuery, PaginatedResponse, PaginationInfo, PostNewTracker,
    StatsResponse,
};

/// 获取追踪链接列表（支持分页和搜索）
pub async fn get_all_links(
    query: web::Query<GetLinksQuery>,
    link_service: web::Data<Arc<LinkService>>,
) -> impl Responder {
    trace!("Admin API: request to list trackers: {:?}", query);

    let result = link_service
        .list_admin_links(AdminLinkQuery {
            search: query.search.clone(),
            page: query.page.unwrap_or(1),
            page_size: query.page_size.unwrap_or(20),
        })
        .await;

    match result {
        Ok(page) => {
            info!(
                "Admin API: returning {} trackers (page {} of {}, total: {})",
                page.items.len(),
                page.page,
                page.total_pages,
                page.total_items
            );

            let items: Vec<AdminLinkResponse> =
                page.items.into_iter().map(AdminLinkResponse::from).collect();

            HttpResponse::Ok()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(PaginatedResponse {
                    code: ErrorCode::Success as i32,
                    message: "OK".to_string(),
                    data: items,
                    pagination: PaginationInfo {
                        page: page.page,
                        page_size: page.page_size,
                        total: page.total_items,
                        total_pages: page.total_pages,
                    },
                })
        }
        Err(e) => error_from_claroche(&e),
    }
}

/// 创建追踪链接
pub async fn post_link(
    body: web::Json<PostNewTracker>,
    link_service: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let body = body.into_inner();

    let Ok(target) = LinkTarget::from_str(&body.target) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "target must be PDP or ADD_TO_CART",
        );
    };

    info!(
        "Admin API: create tracker request - product: {}, target: {}",
        body.product_id, body.target
    );

    let result = link_service
        .create_tracker(CreateTrackerRequest {
            product_id: body.product_id,
            variant_id: body.variant_id,
            label: body.label,
            medium: body.medium,
            target,
            redirect_to: body.redirect_to,
        })
        .await;

    match result {
        Ok(tracker) => success_response(serde_json::json!({
            "id": tracker.id,
            "code": tracker.code,
            "url": tracker.url,
        })),
        Err(e) => error_from_claroche(&e),
    }
}

/// 追踪统计
pub async fn get_stats(link_service: web::Data<Arc<LinkService>>) -> impl Responder {
    let stats = link_service.stats().await;
    success_response(StatsResponse::from(stats))
}
