//! Link tracker operations for SeaOrmStorage
//!
//! Tracker lookup, creation, hit recording, and the admin listing queries.

use std::collections::HashMap;

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::{debug, error};

use super::converters::model_to_tracker;
use super::{SeaOrmStorage, TrackerFilter, retry};
use crate::errors::{ClarocheError, Result};
use crate::storage::models::{LinkTracker, TrackingStats};

use migration::entities::{add_to_cart_event, hit, link_tracker};

/// 单链接命中数聚合行
#[derive(Debug, FromQueryResult)]
struct HitCountRow {
    tracker_id: i64,
    hit_count: i64,
}

impl SeaOrmStorage {
    /// 精确查找短码（调用方负责大写归一化）
    pub async fn find_tracker_by_code(&self, code: &str) -> Result<Option<LinkTracker>> {
        let db = &self.db;
        let code_owned = code.to_string();

        let model = retry::with_retry(
            &format!("find_tracker_by_code({})", code),
            self.retry_config,
            || async {
                link_tracker::Entity::find()
                    .filter(link_tracker::Column::Code.eq(code_owned.clone()))
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| ClarocheError::database_operation(format!("短码查询失败: {}", e)))?;

        Ok(model.map(model_to_tracker))
    }

    /// 短码是否已被占用（生成短码时的碰撞检查）
    pub async fn tracker_code_exists(&self, code: &str) -> Result<bool> {
        let count = link_tracker::Entity::find()
            .filter(link_tracker::Column::Code.eq(code))
            .count(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("短码检查失败: {}", e)))?;
        Ok(count > 0)
    }

    /// 插入追踪链接
    pub async fn insert_tracker(&self, new: NewTracker) -> Result<LinkTracker> {
        let am = link_tracker::ActiveModel {
            code: Set(new.code),
            product_id: Set(new.product_id),
            variant_id: Set(new.variant_id),
            target: Set(new.target),
            redirect_to: Set(new.redirect_to),
            label: Set(new.label),
            medium: Set(new.medium),
            url: Set(new.url),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = link_tracker::Entity::insert(am)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("追踪链接插入失败: {}", e)))?;

        self.invalidate_count_cache();
        Ok(model_to_tracker(model))
    }

    /// 插入一条命中记录（追加式，本层不做去重）
    pub async fn insert_hit(&self, record: NewHit) -> Result<()> {
        let db = &self.db;
        let am = hit::ActiveModel {
            tracker_id: Set(record.tracker_id),
            ip_address: Set(record.ip_address),
            user_agent: Set(record.user_agent),
            referer: Set(record.referer),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        retry::with_retry("insert_hit", self.retry_config, || async {
            hit::Entity::insert(am.clone()).exec(db).await
        })
        .await
        .map_err(|e| ClarocheError::database_operation(format!("命中记录插入失败: {}", e)))?;

        debug!("Hit recorded for tracker {}", record.tracker_id);
        Ok(())
    }

    /// 构建追踪链接过滤条件
    fn tracker_condition(filter: &TrackerFilter) -> Condition {
        let mut condition = Condition::all();

        if let Some(ref search) = filter.search {
            condition = condition.add(
                Condition::any()
                    .add(link_tracker::Column::Code.contains(search))
                    .add(link_tracker::Column::Label.contains(search))
                    .add(link_tracker::Column::Medium.contains(search)),
            );
        }

        condition
    }

    /// 分页加载追踪链接（最新在前）
    pub async fn trackers_page(
        &self,
        filter: &TrackerFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LinkTracker>> {
        let condition = Self::tracker_condition(filter);

        let models = link_tracker::Entity::find()
            .filter(condition)
            .order_by_desc(link_tracker::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| {
                ClarocheError::database_operation(format!("追踪链接分页查询失败: {}", e))
            })?;

        Ok(models.into_iter().map(model_to_tracker).collect())
    }

    /// 统计满足过滤条件的追踪链接数（带 COUNT 缓存）
    pub async fn count_trackers(&self, filter: &TrackerFilter) -> Result<u64> {
        let cache_key = format!("trackers:s={:?}", filter.search);

        if let Some(cached) = self.count_cache.get(&cache_key) {
            debug!("count cache hit: key={}, value={}", cache_key, cached);
            return Ok(cached);
        }

        let condition = Self::tracker_condition(filter);
        let count = link_tracker::Entity::find()
            .filter(condition)
            .count(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("追踪链接计数失败: {}", e)))?;

        self.count_cache.insert(cache_key, count);
        Ok(count)
    }

    /// 批量统计命中数（GROUP BY tracker_id）
    pub async fn hit_counts(&self, tracker_ids: &[i64]) -> Result<HashMap<i64, u64>> {
        if tracker_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = hit::Entity::find()
            .select_only()
            .column(hit::Column::TrackerId)
            .column_as(hit::Column::Id.count(), "hit_count")
            .filter(hit::Column::TrackerId.is_in(tracker_ids.to_vec()))
            .group_by(hit::Column::TrackerId)
            .into_model::<HitCountRow>()
            .all(&self.db)
            .await
            .map_err(|e| ClarocheError::database_operation(format!("命中数聚合失败: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.tracker_id, row.hit_count.max(0) as u64))
            .collect())
    }

    /// 追踪总体统计
    pub async fn tracking_stats(&self) -> TrackingStats {
        let trackers = link_tracker::Entity::find().count(&self.db).await;
        let hits = hit::Entity::find().count(&self.db).await;
        let events = add_to_cart_event::Entity::find().count(&self.db).await;

        match (trackers, hits, events) {
            (Ok(t), Ok(h), Ok(e)) => TrackingStats {
                total_trackers: t as usize,
                total_hits: h as usize,
                total_add_to_cart_events: e as usize,
            },
            _ => {
                error!("追踪统计查询失败");
                TrackingStats::default()
            }
        }
    }
}

/// 追踪链接插入参数
#[derive(Debug, Clone)]
pub struct NewTracker {
    pub code: String,
    pub product_id: i64,
    pub variant_id: Option<i64>,
    /// PDP | ADD_TO_CART
    pub target: String,
    pub redirect_to: Option<String>,
    pub label: String,
    pub medium: Option<String>,
    pub url: String,
}

/// 命中记录插入参数
#[derive(Debug, Clone)]
pub struct NewHit {
    pub tracker_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}
