//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_cors::Cors;
use actix_web::middleware::{Compress, DefaultHeaders, from_fn};
use actix_web::{App, HttpServer, web};
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

use crate::api::middleware::{admin_auth, tracking_rate_limiter};
use crate::api::services::admin::admin_v1_routes;
use crate::api::services::{landing_routes, product_routes, review_routes, tracking_routes};
use crate::config::StaticConfig;
use crate::services::{EventService, LinkService, ProductQueryService, ReviewService};
use crate::storage::StorageFactory;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: StaticConfig) -> Result<()> {
    let storage = StorageFactory::create(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!(e.format_colored()))?;

    let link_service = Arc::new(LinkService::new(storage.clone(), config.site.clone()));
    let product_service = Arc::new(ProductQueryService::new(storage.clone()));
    let event_service = Arc::new(EventService::new(storage.clone()));
    let review_service = Arc::new(ReviewService::new(storage.clone()));

    let admin_prefix = config.admin.prefix.clone();
    if config.admin.token.is_empty() {
        warn!("Admin API is disabled (admin.token not set)");
    } else {
        warn!("Admin API available at: {}", admin_prefix);
    }

    let cpu_count = config.server.cpu_count.min(32);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    let app_config = config.clone();
    let server = HttpServer::new(move || {
        let rate_limit = app_config.rate_limit.clone();

        // 公共追踪端点按客户端 IP 限流
        let api_scope = web::scope("/api")
            .service(product_routes())
            .service(review_routes());
        let api_scope = if rate_limit.enabled {
            api_scope.service(tracking_routes().wrap(tracking_rate_limiter(&rate_limit)))
        } else {
            api_scope.service(tracking_routes())
        };

        App::new()
            .wrap(Cors::default())
            .wrap(Compress::default())
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(link_service.clone()))
            .app_data(web::Data::new(product_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(review_service.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(
                web::scope(&app_config.admin.prefix)
                    .wrap(from_fn(admin_auth))
                    .service(admin_v1_routes()),
            )
            .service(api_scope)
            .service(landing_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(bind_address)?
    .run();

    server.await?;
    Ok(())
}
