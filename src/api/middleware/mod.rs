//! HTTP middleware
//!
//! Admin bearer-token authentication and per-client-IP rate limiting for
//! the public tracking endpoints. Both are constructed from the serving
//! process's configuration — no ambient state.

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpResponse,
    body::BoxBody,
    dev::ServiceResponse,
    web,
};
use governor::middleware::NoOpMiddleware;
use tracing::{debug, info};

use crate::config::{RateLimitConfig, StaticConfig};
use crate::utils::ip::extract_forwarded_ip_from_headers;

/// Admin API 身份验证中间件
///
/// token 为空时认为 Admin API 被禁用，整个前缀返回 404。
pub async fn admin_auth(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    if req.method() == actix_web::http::Method::OPTIONS {
        return Ok(req.into_response(HttpResponse::NoContent().finish()));
    }

    let admin_token = req
        .app_data::<web::Data<StaticConfig>>()
        .map(|config| config.admin.token.clone())
        .unwrap_or_default();

    if admin_token.is_empty() {
        return Ok(req.into_response(
            HttpResponse::NotFound()
                .insert_header(("Content-Type", "text/html; charset=utf-8"))
                .body("Not Found"),
        ));
    }

    // 检查 Authorization header
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Some(auth_bytes) = auth_header.as_bytes().strip_prefix(b"Bearer ")
        && auth_bytes == admin_token.as_bytes()
    {
        debug!("Admin API authentication succeeded");
        return next.call(req).await;
    }

    info!("Admin API authentication failed: token mismatch or missing Authorization header");
    Ok(req.into_response(
        HttpResponse::Unauthorized()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(serde_json::json!({
                "code": 401,
                "message": "Unauthorized: Invalid or missing token",
                "data": null
            })),
    ))
}

/// 基于客户端 IP 的限流 key 提取器
///
/// X-Forwarded-For / X-Real-IP 优先（反向代理部署），回退连接 IP。
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        if let Some(ip) = extract_forwarded_ip_from_headers(req.headers()) {
            return Ok(ip);
        }

        req.connection_info()
            .peer_addr()
            .map(|s| s.to_string())
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))
    }
}

/// 创建公共追踪端点限流器
///
/// 超限返回 HTTP 429 Too Many Requests。
pub fn tracking_rate_limiter(
    config: &RateLimitConfig,
) -> Governor<ClientIpKeyExtractor, NoOpMiddleware> {
    let governor_config = GovernorConfigBuilder::default()
        .seconds_per_request(config.seconds_per_request)
        .burst_size(config.burst_size)
        .key_extractor(ClientIpKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!(
        "Tracking rate limiter created: 1 req/{}s, burst {}",
        config.seconds_per_request, config.burst_size
    );
    Governor::new(&governor_config)
}
