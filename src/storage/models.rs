use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// 商品发布状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// 评论审核状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// 追踪链接目标类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkTarget {
    /// 商品详情页
    #[default]
    Pdp,
    /// 携带 add/variant 参数跳转商店列表页
    AddToCart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    /// Base price in integer minor units
    pub price: i64,
    pub currency: String,
    pub thumbnail_url: Option<String>,
    pub status: ProductStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub rating: i32,
    pub title: Option<String>,
    pub body: String,
    pub status: ReviewStatus,
    pub author_name: String,
    pub author_email: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkTracker {
    pub id: i64,
    pub code: String,
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub target: LinkTarget,
    pub redirect_to: Option<String>,
    pub label: String,
    pub medium: Option<String>,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 追踪统计信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingStats {
    pub total_trackers: usize,
    pub total_hits: usize,
    pub total_add_to_cart_events: usize,
}
