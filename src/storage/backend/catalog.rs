//! Catalog query operations for SeaOrmStorage
//!
//! Product listing with facet filters, derived aggregates, and the
//! supporting lookups used by the PDP and seeding paths.

use std::collections::HashMap;

use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::debug;

use super::converters::{model_to_product, model_to_review, model_to_variant};
use super::{ProductFilter, ProductSort, SeaOrmStorage, retry};
use crate::errors::{ClarocheError, Result};
use crate::storage::models::{Product, Review, ReviewStatus, Variant};

use migration::entities::{product, review, variant};

/// 评论聚合查询结果（DSL 聚合查询）
#[derive(Debug, FromQueryResult)]
struct ReviewAggregateRow {
    product_id: i64,
    review_count: i64,
    rating_sum: Option<i64>,
}

/// 全局价格范围查询结果
#[derive(Debug, FromQueryResult)]
struct PriceRangeRow {
    min_price: Option<i64>,
    max_price: Option<i64>,
}

/// 单个商品的评论聚合
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewAggregate {
    pub review_count: u64,
    pub rating_sum: i64,
}

impl SeaOrmStorage {
    /// 构建商品列表查询条件（只含已发布商品）
    fn product_condition(filter: &ProductFilter) -> Condition {
        let mut condition =
            Condition::all().add(product::Column::Status.eq("PUBLISHED"));

        // size 过滤：存在至少一个 size 命中的变体
        if !filter.sizes.is_empty() {
            let sub = Query::select()
                .column(variant::Column::ProductId)
                .from(variant::Entity)
                .and_where(variant::Column::Size.is_in(filter.sizes.clone()))
                .to_owned();
            condition = condition.add(product::Column::Id.in_subquery(sub));
        }

        // color 过滤：存在至少一个 color 命中的变体
        if !filter.colors.is_empty() {
            let sub = Query::select()
                .column(variant::Column::ProductId)
                .from(variant::Entity)
                .and_where(variant::Column::Color.is_in(filter.colors.clone()))
                .to_owned();
            condition = condition.add(product::Column::Id.in_subquery(sub));
        }

        // 基础价格区间（上下界均可选）
        if let Some(min) = filter.min_price {
            condition = condition.add(product::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            condition = condition.add(product::Column::Price.lte(max));
        }

        condition
    }

    /// 分页加载商品（调用方多取一行以推导 has_next_page）
    pub async fn product_page(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Product>> {
        let condition = Self::product_condition(filter);

        let mut query = product::Entity::find().filter(condition);
        query = match sort {
            ProductSort::Featured => query
                .order_by_desc(product::Column::UpdatedAt)
                .order_by_desc(product::Column::CreatedAt),
            ProductSort::Newest => query.order_by_desc(product::Column::CreatedAt),
            ProductSort::PriceAsc => query.order_by_asc(product::Column::Price),
            ProductSort::PriceDesc => query.order_by_desc(product::Column::Price),
        };

        let db = &self.db;
        let q = query.offset(offset).limit(limit);
        let models = retry::with_retry("product_page", self.retry_config, || async {
            q.clone().all(db).await
        })
        .await
        .map_err(|e| ClarocheError::database_operation(format!("商品分页查询失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_product).collect())
    }

    /// 统计满足过滤条件的商品数（带 COUNT 缓存）
    pub async fn count_products(&self, filter: &ProductFilter) -> Result<u64> {
        let cache_key = format!(
            "products:s={:?}:c={:?}:min={:?}:max={:?}",
            filter.sizes, filter.colors, filter.min_price, filter.max_price
        );

        if let Some(cached) = self.count_cache.get(&cache_key) {
            debug!("count cache hit: key={}, value={}", cache_key, cached);
            return Ok(cached);
        }

        let condition = Self::product_condition(filter);
        let db = &self.db;
        let count = retry::with_retry("count_products", self.retry_config, || async {
            product::Entity::find()
                .filter(condition.clone())
                .count(db)
                .await
        })
        .await
        .map_err(|e| ClarocheError::database_operation(format!("商品计数失败: {}", e)))?;

        self.count_cache.insert(cache_key, count);
        Ok(count)
    }

    /// 全目录去重 size 列表（升序，忽略 NULL）
    pub async fn facet_sizes(&self) -> Result<Vec<String>> {
        let sizes = variant::Entity::find()
            .select_only()
            .column(variant::Column::Size)
            .filter(variant::Column::Size.is_not_null())
            .distinct()
            .order_by_asc(variant::Column::Size)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("size facet 查询失败: {}", e)))?;
        Ok(sizes)
    }

    /// 全目录去重 color 列表（升序，忽略 NULL）
    pub async fn facet_colors(&self) -> Result<Vec<String>> {
        let colors = variant::Entity::find()
            .select_only()
            .column(variant::Column::Color)
            .filter(variant::Column::Color.is_not_null())
            .distinct()
            .order_by_asc(variant::Column::Color)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| {
                ClarocheError::database_operation(format!("color facet 查询失败: {}", e))
            })?;
        Ok(colors)
    }

    /// 全目录基础价格范围（不随当前过滤条件变化）
    pub async fn price_range(&self) -> Result<(Option<i64>, Option<i64>)> {
        let row = product::Entity::find()
            .select_only()
            .column_as(product::Column::Price.min(), "min_price")
            .column_as(product::Column::Price.max(), "max_price")
            .into_model::<PriceRangeRow>()
            .one(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("价格范围查询失败: {}", e)))?;

        match row {
            Some(range) => Ok((range.min_price, range.max_price)),
            None => Ok((None, None)),
        }
    }

    /// 批量加载多个商品的变体
    pub async fn variants_for_products(&self, product_ids: &[i64]) -> Result<Vec<Variant>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = variant::Entity::find()
            .filter(variant::Column::ProductId.is_in(product_ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("变体批量查询失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_variant).collect())
    }

    /// 单商品变体（价格升序，PDP 用）
    pub async fn variants_for_product(&self, product_id: i64) -> Result<Vec<Variant>> {
        let models = variant::Entity::find()
            .filter(variant::Column::ProductId.eq(product_id))
            .order_by_asc(variant::Column::Price)
            .all(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("变体查询失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_variant).collect())
    }

    /// 批量加载已通过审核的评论聚合（count + rating 总和）
    pub async fn review_aggregates(
        &self,
        product_ids: &[i64],
    ) -> Result<HashMap<i64, ReviewAggregate>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = review::Entity::find()
            .select_only()
            .column(review::Column::ProductId)
            .column_as(review::Column::Id.count(), "review_count")
            .column_as(review::Column::Rating.sum(), "rating_sum")
            .filter(review::Column::Status.eq("APPROVED"))
            .filter(review::Column::ProductId.is_in(product_ids.to_vec()))
            .group_by(review::Column::ProductId)
            .into_model::<ReviewAggregateRow>()
            .all(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("评论聚合查询失败: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.product_id,
                    ReviewAggregate {
                        review_count: row.review_count.max(0) as u64,
                        rating_sum: row.rating_sum.unwrap_or(0),
                    },
                )
            })
            .collect())
    }

    /// 单商品已审核评论（最新在前，PDP 用）
    pub async fn approved_reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>> {
        let models = review::Entity::find()
            .filter(review::Column::ProductId.eq(product_id))
            .filter(review::Column::Status.eq("APPROVED"))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("评论查询失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_review).collect())
    }

    /// 批量按 id 加载商品
    pub async fn products_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("商品批量查询失败: {}", e)))?;

        Ok(models
            .into_iter()
            .map(|m| {
                let p = model_to_product(m);
                (p.id, p)
            })
            .collect())
    }

    /// 批量按 id 加载变体
    pub async fn variants_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, Variant>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let models = variant::Entity::find()
            .filter(variant::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("变体批量查询失败: {}", e)))?;

        Ok(models
            .into_iter()
            .map(|m| {
                let v = model_to_variant(m);
                (v.id, v)
            })
            .collect())
    }

    pub async fn find_product(&self, id: i64) -> Result<Option<Product>> {
        let model = product::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("商品查询失败: {}", e)))?;
        Ok(model.map(model_to_product))
    }

    pub async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let model = product::Entity::find()
            .filter(product::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("商品查询失败: {}", e)))?;
        Ok(model.map(model_to_product))
    }

    pub async fn find_variant(&self, id: i64) -> Result<Option<Variant>> {
        let model = variant::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("变体查询失败: {}", e)))?;
        Ok(model.map(model_to_variant))
    }

    /// 插入商品（seed 与测试用）
    pub async fn insert_product(&self, new: NewProduct) -> Result<Product> {
        let now = chrono::Utc::now();
        let am = product::ActiveModel {
            slug: Set(new.slug),
            title: Set(new.title),
            description: Set(new.description),
            price: Set(new.price),
            currency: Set(new.currency),
            thumbnail_url: Set(new.thumbnail_url),
            status: Set(new.status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = product::Entity::insert(am)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("商品插入失败: {}", e)))?;

        self.invalidate_count_cache();
        Ok(model_to_product(model))
    }

    /// 插入变体（seed 与测试用）
    pub async fn insert_variant(&self, new: NewVariant) -> Result<Variant> {
        let am = variant::ActiveModel {
            product_id: Set(new.product_id),
            name: Set(new.name),
            sku: Set(new.sku),
            price: Set(new.price),
            stock: Set(new.stock),
            size: Set(new.size),
            color: Set(new.color),
            image_url: Set(new.image_url),
            ..Default::default()
        };

        let model = variant::Entity::insert(am)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("变体插入失败: {}", e)))?;

        Ok(model_to_variant(model))
    }

    /// 插入评论
    pub async fn insert_review(&self, new: NewReview) -> Result<Review> {
        let am = review::ActiveModel {
            product_id: Set(new.product_id),
            rating: Set(new.rating),
            title: Set(new.title),
            body: Set(new.body),
            status: Set(new.status.as_ref().to_string()),
            author_name: Set(new.author_name),
            author_email: Set(new.author_email),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = review::Entity::insert(am)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("评论插入失败: {}", e)))?;

        Ok(model_to_review(model))
    }
}

/// 商品插入参数
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub thumbnail_url: Option<String>,
    /// DRAFT | PUBLISHED | ARCHIVED
    pub status: String,
}

/// 变体插入参数
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub product_id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

/// 评论插入参数
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: i64,
    pub rating: i32,
    pub title: Option<String>,
    pub body: String,
    pub status: ReviewStatus,
    pub author_name: String,
    pub author_email: Option<String>,
}
