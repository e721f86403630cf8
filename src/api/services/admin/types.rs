//! Admin API 类型定义

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::services::AdminLinkItem;
use crate::storage::TrackingStats;

/// 输出目录常量
pub const TS_EXPORT_PATH: &str = "../storefront/src/lib/types.generated.ts";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(
    export,
    export_to = TS_EXPORT_PATH
)]
#[serde(rename_all = "camelCase")]
pub struct PostNewTracker {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub label: String,
    pub medium: Option<String>,
    /// PDP | ADD_TO_CART
    pub target: String,
    pub redirect_to: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(
    export,
    export_to = TS_EXPORT_PATH
)]
pub struct GetLinksQuery {
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaginatedResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
    pub pagination: PaginationInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(
    export,
    export_to = TS_EXPORT_PATH
)]
pub struct PaginationInfo {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(
    export,
    export_to = TS_EXPORT_PATH
)]
#[serde(rename_all = "camelCase")]
pub struct AdminLinkResponse {
    pub id: i64,
    pub code: String,
    pub label: String,
    pub medium: Option<String>,
    /// PDP | ADD_TO_CART
    pub target: String,
    pub url: String,
    pub created_at: String,
    pub product_title: String,
    pub product_slug: String,
    pub variant_name: Option<String>,
    pub hits: u64,
}

impl From<AdminLinkItem> for AdminLinkResponse {
    fn from(item: AdminLinkItem) -> Self {
        Self {
            id: item.id,
            code: item.code,
            label: item.label,
            medium: item.medium,
            target: item.target.as_ref().to_string(),
            url: item.url,
            created_at: item.created_at.to_rfc3339(),
            product_title: item.product_title,
            product_slug: item.product_slug,
            variant_name: item.variant_name,
            hits: item.hits,
        }
    }
}

/// 统计信息响应
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(
    export,
    export_to = TS_EXPORT_PATH
)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_trackers: usize,
    pub total_hits: usize,
    pub total_add_to_cart_events: usize,
}

impl From<TrackingStats> for StatsResponse {
    fn from(stats: TrackingStats) -> Self {
        Self {
            total_trackers: stats.total_trackers,
            total_hits: stats.total_hits,
            total_add_to_cart_events: stats.total_add_to_cart_events,
        }
    }
}
