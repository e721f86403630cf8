//! Public tracking endpoints
//!
//! `POST /api/links/hit` and `POST /api/events/add-to-cart`. Both are
//! called fire-and-forget from the storefront; responses stay small and
//! status-code driven to match that contract.

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::error;

use crate::errors::ClarocheError;
use crate::services::{EventService, LinkService, RecordHitRequest};
use crate::utils::ip::extract_client_ip;

#[derive(Debug, Deserialize)]
pub struct HitBody {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartBody {
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub tracker_code: Option<String>,
}

/// POST /api/links/hit
pub async fn record_hit(
    req: HttpRequest,
    body: web::Json<HitBody>,
    link_service: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let code = body
        .code
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if code.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Missing code" }));
    }

    let hit = RecordHitRequest {
        code,
        ip_address: extract_client_ip(&req),
        user_agent: req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(String::from),
        referer: req
            .headers()
            .get("referer")
            .and_then(|h| h.to_str().ok())
            .map(String::from),
    };

    match link_service.record_hit(hit).await {
        Ok(Some(_)) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Ok(None) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "Code not found" }))
        }
        Err(e) => {
            error!("Unable to record hit: {}", e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Unable to record hit" }))
        }
    }
}

/// POST /api/events/add-to-cart
pub async fn record_add_to_cart(
    body: web::Json<AddToCartBody>,
    event_service: web::Data<Arc<EventService>>,
) -> impl Responder {
    let Some(product_id) = body.product_id else {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "Missing productId" }));
    };

    let tracker_code = body
        .tracker_code
        .as_deref()
        .filter(|code| !code.is_empty());

    match event_service
        .record_add_to_cart(product_id, body.variant_id, tracker_code)
        .await
    {
        Ok(()) => HttpResponse::Created().json(serde_json::json!({ "ok": true })),
        Err(ClarocheError::NotFound(msg)) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": msg }))
        }
        Err(e) => {
            error!("Unable to track add to cart: {}", e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Unable to track add to cart" }))
        }
    }
}

/// Tracking 路由配置
pub fn tracking_routes() -> actix_web::Scope {
    web::scope("")
        .route("/links/hit", web::post().to(record_hit))
        .route("/events/add-to-cart", web::post().to(record_add_to_cart))
}
