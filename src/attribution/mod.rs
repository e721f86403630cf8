//! Campaign link attribution
//!
//! When a visitor lands via a tracked link, this component (a) records
//! exactly one hit per session per code, (b) optionally auto-adds the
//! referenced variant to the cart exactly once per session per
//! (product, variant, code) triple, and (c) strips the tracking parameters
//! from the visible URL, optionally following a post-add redirect
//! instruction.
//!
//! Idempotence is enforced purely through session-scoped markers — the
//! server never deduplicates hit or event rows.

mod tracking;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tracing::debug;

use crate::cart::{CartItem, CartStore};

pub use tracking::{HttpTrackingClient, TrackingClient};

/// 会话级标记存储键前缀
const MARKER_NAMESPACE: &str = "claroche";

/// 会话级存在性标记（浏览器 sessionStorage 的进程端替身）
#[derive(Default)]
pub struct SessionMarkers {
    markers: DashMap<String, String>,
}

impl SessionMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(suffix: &str) -> String {
        format!("{}:{}", MARKER_NAMESPACE, suffix)
    }

    pub fn is_marked(&self, suffix: &str) -> bool {
        self.markers.contains_key(&Self::key(suffix))
    }

    pub fn mark(&self, suffix: &str) {
        self.markers.insert(Self::key(suffix), "1".to_string());
    }

    pub fn set_last_ref(&self, code: &str) {
        self.markers
            .insert(Self::key("lastRef"), code.to_string());
    }

    pub fn last_ref(&self) -> Option<String> {
        self.markers
            .get(&Self::key("lastRef"))
            .map(|entry| entry.value().clone())
    }
}

/// 追踪链接落地时由服务端预解析好的载荷
#[derive(Debug, Clone)]
pub struct LinkAddPayload {
    pub product_id: i64,
    pub product_title: String,
    pub product_slug: String,
    pub tracker_code: Option<String>,
    pub variant: Option<PayloadVariant>,
    pub redirect: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PayloadVariant {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

/// 一次落地处理的结果
#[derive(Debug, Clone, Default)]
pub struct AttributionOutcome {
    /// 去掉追踪参数后的 URL；仅当与原 URL 不同时为 Some
    /// （history replace 语义：替换当前条目，不新增返回栈）
    pub sanitized_url: Option<String>,
    /// 自动加购后的跳转目标
    pub redirect_to: Option<String>,
    /// 本次自动加入购物车的行项目
    pub added_item: Option<CartItem>,
}

/// Attribution handler: one instance per landing-page mount
pub struct AttributionHandler {
    cart: Arc<CartStore>,
    markers: Arc<SessionMarkers>,
    tracking: Arc<dyn TrackingClient>,
    /// 一次性防重入标记，防止 UI 重渲染下重复执行自动加购
    processed: AtomicBool,
}

impl AttributionHandler {
    pub fn new(
        cart: Arc<CartStore>,
        markers: Arc<SessionMarkers>,
        tracking: Arc<dyn TrackingClient>,
    ) -> Self {
        Self {
            cart,
            markers,
            tracking,
            processed: AtomicBool::new(false),
        }
    }

    /// 处理一次落地页访问
    ///
    /// `current_url` 是浏览器可见 URL（可为相对路径），`payload` 是服务端
    /// 预解析的追踪载荷（无追踪参数时为 None）。
    pub fn process(
        &self,
        current_url: &str,
        payload: Option<&LinkAddPayload>,
    ) -> AttributionOutcome {
        let mut outcome = AttributionOutcome::default();

        // 1. 提取 ref 短码：URL 参数优先，载荷兜底
        let ref_code = extract_query_param(current_url, "ref")
            .or_else(|| payload.and_then(|p| p.tracker_code.clone()));

        // 2. 命中上报：每会话每短码至多一次
        if let Some(ref code) = ref_code {
            self.markers.set_last_ref(code);
            let hit_key = format!("hit:{}", code);
            if !self.markers.is_marked(&hit_key) {
                tracking::fire_and_forget("record_hit", self.tracking.record_hit(code));
                self.markers.mark(&hit_key);
            } else {
                debug!("Hit for '{}' already recorded this session", code);
            }
        }

        // 3. 自动加购：需要已解析变体，每会话每 (product, variant, code) 至多一次
        if let Some(payload) = payload
            && let Some(ref variant) = payload.variant
            && !self.processed.swap(true, Ordering::SeqCst)
        {
            let marker_suffix = format!(
                "autoadd:{}:{}:{}",
                payload.product_id,
                variant.id,
                ref_code.as_deref().unwrap_or("none")
            );

            if self.markers.is_marked(&marker_suffix) {
                debug!("Auto-add already processed this session");
            } else {
                let item = CartItem {
                    id: format!("{}-{}", payload.product_id, variant.id),
                    product_id: payload.product_id,
                    variant_id: variant.id,
                    name: format!("{} - {}", payload.product_title, variant.name),
                    price: variant.price,
                    quantity: 1,
                    image_url: variant.image_url.clone(),
                    size: variant.size.clone(),
                    color: variant.color.clone(),
                };

                // 本地购物车先行；事件上报失败不回滚
                self.cart.add_item(item.clone());
                self.markers.mark(&marker_suffix);

                let tracker_code = ref_code
                    .as_deref()
                    .or(payload.tracker_code.as_deref());
                tracking::fire_and_forget(
                    "record_add_to_cart",
                    self.tracking.record_add_to_cart(
                        payload.product_id,
                        Some(variant.id),
                        tracker_code,
                    ),
                );

                outcome.added_item = Some(item);
            }
        }

        // 4. URL 清理：无论自动加购结果如何都执行
        outcome.sanitized_url = strip_tracking_params(current_url);

        // 5. 加购后跳转
        if let Some(payload) = payload
            && let Some(ref redirect) = payload.redirect
            && !redirect.is_empty()
        {
            outcome.redirect_to = Some(match redirect.as_str() {
                "checkout" => "/checkout".to_string(),
                "pdp" => format!("/product/{}", payload.product_slug),
                other => other.to_string(),
            });
        }

        outcome
    }
}

/// 追踪参数列表（落地后从可见 URL 移除）
const TRACKING_PARAMS: [&str; 4] = ["add", "variant", "ref", "redirect"];

/// 提取 URL 查询参数（支持相对路径）
fn extract_query_param(url: &str, key: &str) -> Option<String> {
    let parsed = parse_lenient(url)?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// 移除追踪参数；URL 未变化时返回 None
fn strip_tracking_params(url: &str) -> Option<String> {
    let parsed = parse_lenient(url)?;

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let total = parsed.query_pairs().count();
    if kept.len() == total {
        return None;
    }

    let mut sanitized = parsed.path().to_string();
    if !kept.is_empty() {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept)
            .finish();
        sanitized.push('?');
        sanitized.push_str(&query);
    }

    Some(sanitized)
}

/// 相对路径借助占位 base 解析
fn parse_lenient(url: &str) -> Option<url::Url> {
    if let Ok(parsed) = url::Url::parse(url) {
        return Some(parsed);
    }
    url::Url::parse("http://localhost")
        .ok()?
        .join(url)
        .ok()
}
