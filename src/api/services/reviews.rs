//! Review submission endpoint

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::error;

use crate::errors::ClarocheError;
use crate::services::{ReviewService, ReviewSubmission, ReviewSubmitOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub product_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// POST /api/reviews
///
/// 校验失败返回 422 + 字段级错误表。
pub async fn submit_review(
    body: web::Json<ReviewBody>,
    reviews: web::Data<Arc<ReviewService>>,
) -> impl Responder {
    let body = body.into_inner();

    let Some(product_id) = body.product_id else {
        return HttpResponse::UnprocessableEntity()
            .json(serde_json::json!({ "error": { "productId": "Missing productId" } }));
    };

    let submission = ReviewSubmission {
        product_id,
        name: body.name.unwrap_or_default(),
        email: body.email,
        rating: body.rating.unwrap_or(0),
        title: body.title,
        body: body.body.unwrap_or_default(),
    };

    match reviews.submit(submission).await {
        Ok(ReviewSubmitOutcome::Created(_)) => {
            HttpResponse::Created().json(serde_json::json!({ "status": "ok" }))
        }
        Ok(ReviewSubmitOutcome::Invalid(errors)) => {
            HttpResponse::UnprocessableEntity().json(serde_json::json!({ "error": errors }))
        }
        Err(ClarocheError::NotFound(msg)) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": msg }))
        }
        Err(e) => {
            error!("Unable to submit review: {}", e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Unable to submit review right now." }))
        }
    }
}

/// Review 路由配置
pub fn review_routes() -> actix_web::Scope {
    web::scope("/reviews").route("", web::post().to(submit_review))
}
