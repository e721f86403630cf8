//! Admin API 路由配置

use actix_web::web;

use super::link_admin::{get_all_links, get_stats, post_link};

/// 追踪链接管理路由 `/links`
///
/// 包含：
/// - GET/HEAD /links - 获取追踪链接列表
/// - POST /links - 创建追踪链接
pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("", web::get().to(get_all_links))
        .route("", web::head().to(get_all_links))
        .route("", web::post().to(post_link))
}

/// 统计路由 `/stats`
pub fn stats_routes() -> actix_web::Scope {
    web::scope("/stats")
        .route("", web::get().to(get_stats))
        .route("", web::head().to(get_stats))
}

/// Admin API v1 路由
pub fn admin_v1_routes() -> actix_web::Scope {
    web::scope("/v1").service(links_routes()).service(stats_routes())
}
