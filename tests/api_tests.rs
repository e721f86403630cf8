//! HTTP API integration tests
//!
//! Exercises the public endpoints and the admin scope against a temporary
//! SQLite database, using actix's in-process test service.

use std::sync::Arc;

use actix_web::middleware::from_fn;
use actix_web::{App, test, web};
use tempfile::TempDir;

use claroche::api::middleware::admin_auth;
use claroche::api::services::admin::admin_v1_routes;
use claroche::api::services::{landing_routes, product_routes, review_routes, tracking_routes};
use claroche::config::{DatabaseConfig, StaticConfig};
use claroche::services::{
    CreateTrackerRequest, EventService, LinkService, ProductQueryService, ReviewService,
};
use claroche::storage::backend::{NewProduct, NewVariant};
use claroche::storage::{LinkTarget, SeaOrmStorage, StorageFactory};

// =============================================================================
// Test Setup
// =============================================================================

struct TestContext {
    config: StaticConfig,
    storage: Arc<SeaOrmStorage>,
    link_service: Arc<LinkService>,
    product_service: Arc<ProductQueryService>,
    event_service: Arc<EventService>,
    review_service: Arc<ReviewService>,
    _dir: TempDir,
}

async fn create_context(admin_token: &str) -> TestContext {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("claroche-test.db");

    let mut config = StaticConfig::default();
    config.database = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };
    config.admin.token = admin_token.to_string();

    let storage = StorageFactory::create(&config.database)
        .await
        .expect("Failed to create test storage");

    TestContext {
        link_service: Arc::new(LinkService::new(storage.clone(), config.site.clone())),
        product_service: Arc::new(ProductQueryService::new(storage.clone())),
        event_service: Arc::new(EventService::new(storage.clone())),
        review_service: Arc::new(ReviewService::new(storage.clone())),
        config,
        storage,
        _dir: dir,
    }
}

/// 路由布局与 runtime::server 保持一致（省略限流器）
macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.config.clone()))
                .app_data(web::Data::new($ctx.link_service.clone()))
                .app_data(web::Data::new($ctx.product_service.clone()))
                .app_data(web::Data::new($ctx.event_service.clone()))
                .app_data(web::Data::new($ctx.review_service.clone()))
                .service(
                    web::scope("/admin")
                        .wrap(from_fn(admin_auth))
                        .service(admin_v1_routes()),
                )
                .service(
                    web::scope("/api")
                        .service(product_routes())
                        .service(review_routes())
                        .service(tracking_routes()),
                )
                .service(landing_routes()),
        )
        .await
    };
}

async fn seed_product(ctx: &TestContext, slug: &str) -> (i64, i64) {
    let product = ctx
        .storage
        .insert_product(NewProduct {
            slug: slug.to_string(),
            title: format!("Product {}", slug),
            description: None,
            price: 14900,
            currency: "USD".to_string(),
            thumbnail_url: None,
            status: "PUBLISHED".to_string(),
        })
        .await
        .unwrap();

    let variant = ctx
        .storage
        .insert_variant(NewVariant {
            product_id: product.id,
            name: "Ivory / S".to_string(),
            sku: None,
            price: 14900,
            stock: 5,
            size: Some("S".to_string()),
            color: Some("Ivory".to_string()),
            image_url: None,
        })
        .await
        .unwrap();

    (product.id, variant.id)
}

async fn seed_tracker(ctx: &TestContext, product_id: i64, variant_id: i64) -> String {
    ctx.link_service
        .create_tracker(CreateTrackerRequest {
            product_id,
            variant_id: Some(variant_id),
            label: "Instagram Editorial".to_string(),
            medium: Some("social".to_string()),
            target: LinkTarget::AddToCart,
            redirect_to: None,
        })
        .await
        .unwrap()
        .code
}

// =============================================================================
// Tracking endpoints
// =============================================================================

#[actix_web::test]
async fn test_hit_endpoint_missing_code() {
    let ctx = create_context("").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/links/hit")
        .set_json(serde_json::json!({ "code": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_hit_endpoint_unknown_code() {
    let ctx = create_context("").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/links/hit")
        .set_json(serde_json::json!({ "code": "ZZZZZZ" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_hit_endpoint_records_every_call() {
    let ctx = create_context("").await;
    let (product_id, variant_id) = seed_product(&ctx, "aurora-silk-blouse").await;
    let code = seed_tracker(&ctx, product_id, variant_id).await;
    let app = init_app!(ctx);

    // 直接调用端点两次：服务端不去重，产生两条命中行
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/links/hit")
            .set_json(serde_json::json!({ "code": code }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    assert_eq!(ctx.storage.tracking_stats().await.total_hits, 2);
}

#[actix_web::test]
async fn test_add_to_cart_event_endpoint() {
    let ctx = create_context("").await;
    let (product_id, variant_id) = seed_product(&ctx, "aurora-silk-blouse").await;
    let code = seed_tracker(&ctx, product_id, variant_id).await;
    let app = init_app!(ctx);

    // 缺 productId
    let req = test::TestRequest::post()
        .uri("/api/events/add-to-cart")
        .set_json(serde_json::json!({ "variantId": variant_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // 未知商品
    let req = test::TestRequest::post()
        .uri("/api/events/add-to-cart")
        .set_json(serde_json::json!({ "productId": 999_999 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // 正常记录
    let req = test::TestRequest::post()
        .uri("/api/events/add-to-cart")
        .set_json(serde_json::json!({
            "productId": product_id,
            "variantId": variant_id,
            "trackerCode": code,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    assert_eq!(ctx.storage.tracking_stats().await.total_add_to_cart_events, 1);
}

// =============================================================================
// Landing redirect
// =============================================================================

#[actix_web::test]
async fn test_landing_redirects_to_destination() {
    let ctx = create_context("").await;
    let (product_id, variant_id) = seed_product(&ctx, "aurora-silk-blouse").await;
    let code = seed_tracker(&ctx, product_id, variant_id).await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri(&format!("/l/{}", code))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 308);
    let location = resp
        .headers()
        .get("Location")
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert!(location.starts_with("/shop?"));
    assert!(location.contains(&format!("ref={}", code)));
    assert!(location.contains(&format!("add={}", product_id)));
}

#[actix_web::test]
async fn test_landing_lowercase_code_resolves() {
    let ctx = create_context("").await;
    let (product_id, variant_id) = seed_product(&ctx, "aurora-silk-blouse").await;
    let code = seed_tracker(&ctx, product_id, variant_id).await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri(&format!("/l/{}", code.to_lowercase()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 308);
}

#[actix_web::test]
async fn test_landing_unknown_code_falls_back_to_shop() {
    let ctx = create_context("").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/l/ZZZZZZ").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 308);
    assert_eq!(
        resp.headers().get("Location").and_then(|h| h.to_str().ok()),
        Some("/shop")
    );
}

// =============================================================================
// Products & reviews
// =============================================================================

#[actix_web::test]
async fn test_products_endpoint_returns_listing() {
    let ctx = create_context("").await;
    seed_product(&ctx, "aurora-silk-blouse").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/products?size=S&sort=price-asc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["pageInfo"]["page"], 1);
    assert_eq!(body["facets"]["sizes"][0], "S");
}

#[actix_web::test]
async fn test_product_detail_endpoint() {
    let ctx = create_context("").await;
    seed_product(&ctx, "aurora-silk-blouse").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/products/aurora-silk-blouse")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri("/api/products/missing-product")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_review_endpoint_validation() {
    let ctx = create_context("").await;
    let (product_id, _) = seed_product(&ctx, "aurora-silk-blouse").await;
    let app = init_app!(ctx);

    // 校验失败：正文过短
    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .set_json(serde_json::json!({
            "productId": product_id,
            "name": "Sienna Park",
            "rating": 5,
            "body": "Too short",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"]["body"].is_string());

    // 正常提交
    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .set_json(serde_json::json!({
            "productId": product_id,
            "name": "Sienna Park",
            "rating": 5,
            "body": "The fabric feels luxurious and the color saturation is gorgeous.",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
}

// =============================================================================
// Admin scope
// =============================================================================

#[actix_web::test]
async fn test_admin_disabled_when_token_empty() {
    let ctx = create_context("").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/admin/v1/links").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_admin_requires_bearer_token() {
    let ctx = create_context("sekrit").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/admin/v1/links").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/admin/v1/links")
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_admin_create_and_list_links() {
    let ctx = create_context("sekrit").await;
    let (product_id, variant_id) = seed_product(&ctx, "aurora-silk-blouse").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/admin/v1/links")
        .insert_header(("Authorization", "Bearer sekrit"))
        .set_json(serde_json::json!({
            "productId": product_id,
            "variantId": variant_id,
            "label": "Newsletter Launch",
            "medium": "email",
            "target": "ADD_TO_CART",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["code"].as_str().unwrap().len(), 6);

    let req = test::TestRequest::get()
        .uri("/admin/v1/links")
        .insert_header(("Authorization", "Bearer sekrit"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["label"], "Newsletter Launch");
}

#[actix_web::test]
async fn test_admin_rejects_bad_target() {
    let ctx = create_context("sekrit").await;
    let (product_id, _) = seed_product(&ctx, "aurora-silk-blouse").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/admin/v1/links")
        .insert_header(("Authorization", "Bearer sekrit"))
        .set_json(serde_json::json!({
            "productId": product_id,
            "label": "Bad",
            "target": "TELEPORT",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
