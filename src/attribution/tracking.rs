//! Best-effort tracking client
//!
//! The storefront runtime reports hits and add-to-cart events over plain
//! HTTP. Both calls are best-effort by contract: a failed POST must never
//! block or roll back a local cart mutation, so errors surface only through
//! the tracing channel.

use std::time::Duration;

use tracing::warn;
use ureq::Agent;

use crate::errors::{ClarocheError, Result};

/// HTTP 请求超时时间
const HTTP_TIMEOUT_SECS: u64 = 2;

/// 追踪上报客户端
pub trait TrackingClient: Send + Sync {
    /// 上报一次落地页命中
    fn record_hit(&self, code: &str) -> Result<()>;

    /// 上报一次 add-to-cart 事件
    fn record_add_to_cart(
        &self,
        product_id: i64,
        variant_id: Option<i64>,
        tracker_code: Option<&str>,
    ) -> Result<()>;
}

/// 基于 ureq 的同步 HTTP 实现
pub struct HttpTrackingClient {
    agent: Agent,
    base_url: String,
}

impl HttpTrackingClient {
    pub fn new(base_url: &str) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl TrackingClient for HttpTrackingClient {
    fn record_hit(&self, code: &str) -> Result<()> {
        let url = format!("{}/api/links/hit", self.base_url);
        self.agent
            .post(&url)
            .send_json(serde_json::json!({ "code": code }))
            .map_err(|e| ClarocheError::validation(format!("hit 上报失败: {}", e)))?;
        Ok(())
    }

    fn record_add_to_cart(
        &self,
        product_id: i64,
        variant_id: Option<i64>,
        tracker_code: Option<&str>,
    ) -> Result<()> {
        let url = format!("{}/api/events/add-to-cart", self.base_url);
        self.agent
            .post(&url)
            .send_json(serde_json::json!({
                "productId": product_id,
                "variantId": variant_id,
                "trackerCode": tracker_code,
            }))
            .map_err(|e| ClarocheError::validation(format!("add-to-cart 上报失败: {}", e)))?;
        Ok(())
    }
}

/// 吞掉错误并记录日志的便捷包装
pub(crate) fn fire_and_forget(label: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!("Tracking call '{}' failed (non-blocking): {}", label, e);
    }
}
