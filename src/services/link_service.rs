//! Link tracker service
//!
//! Provides unified business logic for campaign link operations, shared
//! between the public redirect/tracking handlers and the admin API.

use std::sync::Arc;

use tracing::info;
use url::form_urlencoded;

use crate::config::SiteConfig;
use crate::errors::{ClarocheError, Result};
use crate::storage::backend::NewTracker;
use crate::storage::{LinkTarget, LinkTracker, SeaOrmStorage, TrackerFilter, TrackingStats};
use crate::utils::{generate_tracker_code, is_valid_tracker_code, normalize_tracker_code};

/// 默认短码长度
const DEFAULT_CODE_LENGTH: usize = 6;

// ============ Request/Response DTOs ============

/// Request to create a new tracker
#[derive(Debug, Clone)]
pub struct CreateTrackerRequest {
    pub product_id: i64,
    /// Optional variant pin (required for meaningful ADD_TO_CART links)
    pub variant_id: Option<i64>,
    pub label: String,
    pub medium: Option<String>,
    pub target: LinkTarget,
    /// Post-add redirect instruction ("checkout", "pdp", or explicit path)
    pub redirect_to: Option<String>,
}

/// Request to record one landing hit
#[derive(Debug, Clone, Default)]
pub struct RecordHitRequest {
    pub code: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Admin listing query
#[derive(Debug, Clone, Default)]
pub struct AdminLinkQuery {
    pub search: Option<String>,
    pub page: u64,
    pub page_size: u64,
}

/// Single row of the admin listing
#[derive(Debug, Clone)]
pub struct AdminLinkItem {
    pub id: i64,
    pub code: String,
    pub label: String,
    pub medium: Option<String>,
    pub target: LinkTarget,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub product_title: String,
    pub product_slug: String,
    pub variant_name: Option<String>,
    pub hits: u64,
}

/// Admin listing page
#[derive(Debug, Clone)]
pub struct AdminLinkPage {
    pub items: Vec<AdminLinkItem>,
    pub total_items: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

// ============ LinkService Implementation ============

/// Service for campaign link operations
pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
    site: SiteConfig,
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>, site: SiteConfig) -> Self {
        Self { storage, site }
    }

    /// 大写归一化后的精确查找
    pub async fn find_by_code(&self, code: &str) -> Result<Option<LinkTracker>> {
        let code = normalize_tracker_code(code);
        if !is_valid_tracker_code(&code) {
            return Ok(None);
        }
        self.storage.find_tracker_by_code(&code).await
    }

    /// 记录一次命中
    ///
    /// 未知短码返回 Ok(None)，不产生命中行；调用方必须按「未找到」处理。
    /// 本层不做去重：同一短码的重复调用产生重复命中行，会话级去重是
    /// 客户端（attribution 标记）的职责。
    pub async fn record_hit(&self, req: RecordHitRequest) -> Result<Option<LinkTracker>> {
        let Some(tracker) = self.find_by_code(&req.code).await? else {
            return Ok(None);
        };

        self.storage
            .insert_hit(crate::storage::NewHit {
                tracker_id: tracker.id,
                ip_address: req.ip_address,
                user_agent: req.user_agent,
                referer: req.referer,
            })
            .await?;

        Ok(Some(tracker))
    }

    /// 创建追踪链接（admin 操作）
    pub async fn create_tracker(&self, req: CreateTrackerRequest) -> Result<LinkTracker> {
        if req.label.trim().is_empty() {
            return Err(ClarocheError::validation("label 不能为空"));
        }

        let product = self
            .storage
            .find_product(req.product_id)
            .await?
            .ok_or_else(|| {
                ClarocheError::not_found(format!("Product {} not found", req.product_id))
            })?;

        if let Some(variant_id) = req.variant_id {
            let variant = self
                .storage
                .find_variant(variant_id)
                .await?
                .ok_or_else(|| {
                    ClarocheError::not_found(format!("Variant {} not found", variant_id))
                })?;
            if variant.product_id != req.product_id {
                return Err(ClarocheError::validation(format!(
                    "Variant {} does not belong to product {}",
                    variant_id, req.product_id
                )));
            }
        }

        let code = self.generate_unique_code(DEFAULT_CODE_LENGTH).await?;

        let destination = Self::build_destination(
            &self.site,
            &code,
            req.product_id,
            &product.slug,
            req.variant_id,
            req.target,
            req.redirect_to.as_deref(),
        );
        let url = format!("{}{}", self.site.base_url.trim_end_matches('/'), destination);

        let tracker = self
            .storage
            .insert_tracker(NewTracker {
                code: code.clone(),
                product_id: req.product_id,
                variant_id: req.variant_id,
                target: req.target.as_ref().to_string(),
                redirect_to: req.redirect_to.filter(|r| !r.is_empty()),
                label: req.label.trim().to_string(),
                medium: req.medium.filter(|m| !m.is_empty()),
                url,
            })
            .await?;

        info!(
            "LinkService: created tracker '{}' -> product '{}'",
            tracker.code, product.slug
        );
        Ok(tracker)
    }

    /// 拒绝采样生成唯一短码
    ///
    /// 循环没有尝试次数上限：32^6 ≈ 10.7 亿的码空间在预期表规模下
    /// 碰撞概率可忽略，平均一次命中。
    async fn generate_unique_code(&self, length: usize) -> Result<String> {
        loop {
            let code = generate_tracker_code(length);
            if !self.storage.tracker_code_exists(&code).await? {
                return Ok(code);
            }
        }
    }

    /// 解析追踪链接的落地目标（站内相对路径）
    pub async fn destination_for(&self, tracker: &LinkTracker) -> Result<String> {
        let slug = match tracker.target {
            // ADD_TO_CART 落地商店列表页，不需要 slug
            LinkTarget::AddToCart => String::new(),
            LinkTarget::Pdp => self
                .storage
                .find_product(tracker.product_id)
                .await?
                .map(|p| p.slug)
                .unwrap_or_default(),
        };

        if tracker.target == LinkTarget::Pdp && slug.is_empty() {
            // 商品已被删除，退回商店列表页
            return Ok(self.site.shop_path.clone());
        }

        Ok(Self::build_destination(
            &self.site,
            &tracker.code,
            tracker.product_id,
            &slug,
            tracker.variant_id,
            tracker.target,
            tracker.redirect_to.as_deref(),
        ))
    }

    /// 构建落地路径
    fn build_destination(
        site: &SiteConfig,
        code: &str,
        product_id: i64,
        product_slug: &str,
        variant_id: Option<i64>,
        target: LinkTarget,
        redirect: Option<&str>,
    ) -> String {
        match target {
            LinkTarget::AddToCart => {
                let mut params = form_urlencoded::Serializer::new(String::new());
                params.append_pair("add", &product_id.to_string());
                params.append_pair("ref", code);
                if let Some(variant_id) = variant_id {
                    params.append_pair("variant", &variant_id.to_string());
                }
                if let Some(redirect) = redirect.filter(|r| !r.is_empty()) {
                    params.append_pair("redirect", redirect);
                }
                format!("{}?{}", site.shop_path, params.finish())
            }
            LinkTarget::Pdp => {
                let mut params = form_urlencoded::Serializer::new(String::new());
                params.append_pair("ref", code);
                if let Some(redirect) = redirect.filter(|r| !r.is_empty()) {
                    params.append_pair("redirect", redirect);
                }
                format!("/product/{}?{}", product_slug, params.finish())
            }
        }
    }

    /// Admin 分页列表（带命中数与商品信息）
    pub async fn list_admin_links(&self, query: AdminLinkQuery) -> Result<AdminLinkPage> {
        let page = query.page.max(1);
        let page_size = query.page_size.clamp(1, 100);
        let offset = (page - 1) * page_size;

        let filter = TrackerFilter {
            search: query.search.filter(|s| !s.is_empty()),
        };

        let trackers = self.storage.trackers_page(&filter, offset, page_size).await?;
        let total_items = self.storage.count_trackers(&filter).await?;

        let tracker_ids: Vec<i64> = trackers.iter().map(|t| t.id).collect();
        let product_ids: Vec<i64> = trackers.iter().map(|t| t.product_id).collect();
        let variant_ids: Vec<i64> = trackers.iter().filter_map(|t| t.variant_id).collect();

        let hit_counts = self.storage.hit_counts(&tracker_ids).await?;
        let products = self.storage.products_by_ids(&product_ids).await?;
        let variants = self.storage.variants_by_ids(&variant_ids).await?;

        let items = trackers
            .into_iter()
            .map(|tracker| {
                let product = products.get(&tracker.product_id);
                let variant_name = tracker
                    .variant_id
                    .and_then(|id| variants.get(&id))
                    .map(|v| v.name.clone());
                AdminLinkItem {
                    hits: hit_counts.get(&tracker.id).copied().unwrap_or(0),
                    product_title: product.map(|p| p.title.clone()).unwrap_or_default(),
                    product_slug: product.map(|p| p.slug.clone()).unwrap_or_default(),
                    variant_name,
                    id: tracker.id,
                    code: tracker.code,
                    label: tracker.label,
                    medium: tracker.medium,
                    target: tracker.target,
                    url: tracker.url,
                    created_at: tracker.created_at,
                }
            })
            .collect();

        Ok(AdminLinkPage {
            items,
            total_items,
            page,
            page_size,
            total_pages: total_items.div_ceil(page_size).max(1),
        })
    }

    /// 追踪统计
    pub async fn stats(&self) -> TrackingStats {
        self.storage.tracking_stats().await
    }
}
