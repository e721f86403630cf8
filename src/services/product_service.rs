//! Product query service
//!
//! Translates a filter specification into a paginated, faceted product
//! listing with derived per-item fields, plus the PDP detail lookup.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use url::form_urlencoded;

use crate::errors::Result;
use crate::storage::{ProductFilter, ProductSort, Review, SeaOrmStorage, Variant};

/// 默认每页条数
const DEFAULT_TAKE: u64 = 12;

/// 商品列表排序选项
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortOption {
    #[default]
    Featured,
    New,
    PriceAsc,
    PriceDesc,
}

impl From<SortOption> for ProductSort {
    fn from(sort: SortOption) -> Self {
        match sort {
            SortOption::Featured => ProductSort::Featured,
            SortOption::New => ProductSort::Newest,
            SortOption::PriceAsc => ProductSort::PriceAsc,
            SortOption::PriceDesc => ProductSort::PriceDesc,
        }
    }
}

/// 商品列表查询参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListParams {
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    /// 分
    pub min_price: Option<i64>,
    /// 分
    pub max_price: Option<i64>,
    pub sort: Option<SortOption>,
    pub page: Option<u64>,
    pub take: Option<u64>,
}

/// 解析查询字符串为列表参数
///
/// size/color 同时支持重复参数与逗号分隔；金额参数接受 "49", "49.90",
/// "49,90" 等写法，归一化为分；非法 sort/page/take 忽略。
pub fn parse_product_list_params(query: &str) -> ProductListParams {
    let mut params = ProductListParams::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "size" => params.sizes.extend(split_facet_values(&value)),
            "color" => params.colors.extend(split_facet_values(&value)),
            "minPrice" => params.min_price = parse_money(&value),
            "maxPrice" => params.max_price = parse_money(&value),
            "sort" => params.sort = SortOption::from_str(&value).ok(),
            "page" => params.page = value.parse::<u64>().ok().map(|p| p.max(1)),
            "take" => params.take = value.parse::<u64>().ok().map(|t| t.max(1)),
            _ => {}
        }
    }

    params
}

fn split_facet_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// 金额解析：逗号归一化为小数点，去掉非数字字符，转为分并下夹 0
fn parse_money(raw: &str) -> Option<i64> {
    let normalized: String = raw
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let parsed = normalized.parse::<f64>().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(((parsed * 100.0).round() as i64).max(0))
}

// ============ Response DTOs ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummary {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl From<Variant> for VariantSummary {
    fn from(variant: Variant) -> Self {
        Self {
            id: variant.id,
            name: variant.name,
            price: variant.price,
            stock: variant.stock,
            size: variant.size,
            color: variant.color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItem {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price: i64,
    pub min_variant_price: i64,
    pub max_variant_price: i64,
    /// 已审核评论均分，保留一位小数；无已审核评论为 null
    pub average_rating: Option<f64>,
    pub review_count: u64,
    pub variants: Vec<VariantSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u64,
    pub take: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetSummary {
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub price_range: PriceRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub items: Vec<ProductListItem>,
    pub page_info: PageInfo,
    pub facets: FacetSummary,
}

/// PDP 详情
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub thumbnail_url: Option<String>,
    pub variants: Vec<VariantSummary>,
    pub reviews: Vec<ReviewSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub id: i64,
    pub rating: i32,
    pub title: Option<String>,
    pub body: String,
    pub author_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewSummary {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            rating: review.rating,
            title: review.title,
            body: review.body,
            author_name: review.author_name,
            created_at: review.created_at,
        }
    }
}

// ============ ProductQueryService Implementation ============

/// Service for faceted product listings
pub struct ProductQueryService {
    storage: Arc<SeaOrmStorage>,
}

impl ProductQueryService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 分页商品列表
    pub async fn product_list(&self, params: ProductListParams) -> Result<ProductListResponse> {
        let take = params.take.unwrap_or(DEFAULT_TAKE).max(1);
        let page = params.page.unwrap_or(1).max(1);
        let skip = (page - 1) * take;

        let filter = ProductFilter {
            sizes: params.sizes,
            colors: params.colors,
            min_price: params.min_price,
            max_price: params.max_price,
        };
        let sort: ProductSort = params.sort.unwrap_or_default().into();

        // 页面级并发读取：数据页（多取一行推导 has_next_page）、总数与 facet
        let (page_rows, total_items, sizes, colors, price_range) = tokio::join!(
            self.storage.product_page(&filter, sort, skip, take + 1),
            self.storage.count_products(&filter),
            self.storage.facet_sizes(),
            self.storage.facet_colors(),
            self.storage.price_range(),
        );

        let mut products = page_rows?;
        let total_items = total_items?;
        let sizes = sizes?;
        let colors = colors?;
        let (min_price, max_price) = price_range?;

        let has_next_page = products.len() as u64 > take;
        products.truncate(take as usize);

        let product_ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        let (variants, aggregates) = tokio::join!(
            self.storage.variants_for_products(&product_ids),
            self.storage.review_aggregates(&product_ids),
        );
        let variants = variants?;
        let aggregates = aggregates?;

        let items = products
            .into_iter()
            .map(|product| {
                let own_variants: Vec<VariantSummary> = variants
                    .iter()
                    .filter(|v| v.product_id == product.id)
                    .cloned()
                    .map(VariantSummary::from)
                    .collect();

                let variant_prices: Vec<i64> = own_variants.iter().map(|v| v.price).collect();
                let min_variant_price =
                    variant_prices.iter().min().copied().unwrap_or(product.price);
                let max_variant_price =
                    variant_prices.iter().max().copied().unwrap_or(product.price);

                let aggregate = aggregates.get(&product.id).copied().unwrap_or_default();
                let average_rating = if aggregate.review_count > 0 {
                    let mean = aggregate.rating_sum as f64 / aggregate.review_count as f64;
                    Some((mean * 10.0).round() / 10.0)
                } else {
                    None
                };

                ProductListItem {
                    id: product.id,
                    slug: product.slug,
                    title: product.title,
                    description: product.description,
                    thumbnail_url: product.thumbnail_url,
                    price: product.price,
                    min_variant_price,
                    max_variant_price,
                    average_rating,
                    review_count: aggregate.review_count,
                    variants: own_variants,
                }
            })
            .collect();

        Ok(ProductListResponse {
            items,
            page_info: PageInfo {
                page,
                take,
                total_items,
                total_pages: total_items.div_ceil(take).max(1),
                has_next_page,
                has_previous_page: page > 1,
            },
            facets: FacetSummary {
                sizes,
                colors,
                price_range: PriceRange {
                    min: min_price,
                    max: max_price,
                },
            },
        })
    }

    /// PDP 详情：商品 + 变体（价格升序）+ 已审核评论（最新在前）
    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>> {
        let Some(product) = self.storage.find_product_by_slug(slug).await? else {
            return Ok(None);
        };

        let (variants, reviews) = tokio::join!(
            self.storage.variants_for_product(product.id),
            self.storage.approved_reviews_for_product(product.id),
        );

        Ok(Some(ProductDetail {
            id: product.id,
            slug: product.slug,
            title: product.title,
            description: product.description,
            price: product.price,
            currency: product.currency,
            thumbnail_url: product.thumbnail_url,
            variants: variants?.into_iter().map(VariantSummary::from).collect(),
            reviews: reviews?.into_iter().map(ReviewSummary::from).collect(),
        }))
    }
}
