//! Campaign link landing handler
//!
//! `GET /l/{code}` resolves a tracker code to its destination and records
//! one hit row. Hit recording runs in a background task so a slow or
//! failing insert never delays the redirect; unknown codes land on the
//! shop listing.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{error, trace, warn};

use crate::config::StaticConfig;
use crate::services::{LinkService, RecordHitRequest};
use crate::utils::ip::extract_client_ip;
use crate::utils::is_valid_tracker_code;
use crate::utils::normalize_tracker_code;

pub struct RedirectService {}

impl RedirectService {
    pub async fn handle_landing(
        req: HttpRequest,
        path: web::Path<String>,
        link_service: web::Data<Arc<LinkService>>,
        config: web::Data<StaticConfig>,
    ) -> impl Responder {
        let code = normalize_tracker_code(&path.into_inner());

        if !is_valid_tracker_code(&code) {
            // 非法短码直接回商店列表页，不查库
            trace!("Invalid tracker code rejected: {}", &code);
            return Self::shop_redirect(&config.site.shop_path);
        }

        let tracker = match link_service.find_by_code(&code).await {
            Ok(Some(tracker)) => tracker,
            Ok(None) => {
                trace!("Unknown tracker code: {}", &code);
                return Self::shop_redirect(&config.site.shop_path);
            }
            Err(e) => {
                error!("Database error during landing lookup: {}", e);
                return Self::shop_redirect(&config.site.shop_path);
            }
        };

        Self::record_hit_detached(&req, &link_service, code);

        match link_service.destination_for(&tracker).await {
            Ok(destination) => Self::permanent_redirect(&destination),
            Err(e) => {
                error!("Failed to build destination for '{}': {}", tracker.code, e);
                Self::shop_redirect(&config.site.shop_path)
            }
        }
    }

    /// 命中记录在后台任务执行，不阻塞重定向响应
    fn record_hit_detached(
        req: &HttpRequest,
        link_service: &web::Data<Arc<LinkService>>,
        code: String,
    ) {
        let hit = RecordHitRequest {
            code,
            ip_address: extract_client_ip(req),
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

        let link_service = Arc::clone(link_service.get_ref());
        tokio::spawn(async move {
            if let Err(e) = link_service.record_hit(hit).await {
                warn!("Hit recording failed (non-blocking): {}", e);
            }
        });
    }

    #[inline]
    fn permanent_redirect(location: &str) -> HttpResponse {
        HttpResponse::build(StatusCode::PERMANENT_REDIRECT)
            .insert_header(("Location", location))
            .finish()
    }

    #[inline]
    fn shop_redirect(shop_path: &str) -> HttpResponse {
        Self::permanent_redirect(shop_path)
    }
}

/// Landing 路由配置
pub fn landing_routes() -> actix_web::Scope {
    web::scope("/l")
        .route("/{code}", web::get().to(RedirectService::handle_landing))
        .route("/{code}", web::head().to(RedirectService::handle_landing))
}
