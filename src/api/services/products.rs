//! Product listing and detail endpoints

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::error;

use crate::services::{ProductQueryService, parse_product_list_params};

/// GET /api/products
///
/// size/color 支持重复参数与逗号分隔，手工解析查询串而不是依赖
/// 框架的单值提取。
pub async fn get_product_list(
    req: HttpRequest,
    products: web::Data<Arc<ProductQueryService>>,
) -> impl Responder {
    let params = parse_product_list_params(req.query_string());

    match products.product_list(params).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            error!("Unable to load products: {}", e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Unable to load products" }))
        }
    }
}

/// GET /api/products/{slug}
pub async fn get_product_detail(
    path: web::Path<String>,
    products: web::Data<Arc<ProductQueryService>>,
) -> impl Responder {
    let slug = path.into_inner();

    match products.product_by_slug(&slug).await {
        Ok(Some(detail)) => HttpResponse::Ok().json(detail),
        Ok(None) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "Product not found" }))
        }
        Err(e) => {
            error!("Unable to load product '{}': {}", slug, e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Unable to load product" }))
        }
    }
}

/// Product 路由配置
pub fn product_routes() -> actix_web::Scope {
    web::scope("/products")
        .route("", web::get().to(get_product_list))
        .route("/{slug}", web::get().to(get_product_detail))
}
