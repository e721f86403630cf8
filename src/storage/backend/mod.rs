//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod catalog;
mod connection;
mod converters;
mod events;
pub mod retry;
mod trackers;

use std::time::Duration;

use moka::sync::Cache;
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::{Result, ClarocheError};

pub use catalog::{NewProduct, NewReview, NewVariant, ReviewAggregate};
pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{
    model_to_product, model_to_review, model_to_tracker, model_to_variant,
};
pub use trackers::{NewHit, NewTracker};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(ClarocheError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 商品列表过滤条件
#[derive(Default, Clone, Debug)]
pub struct ProductFilter {
    /// 至少一个变体的 size 命中其一
    pub sizes: Vec<String>,
    /// 至少一个变体的 color 命中其一
    pub colors: Vec<String>,
    /// 基础价格下限（分）
    pub min_price: Option<i64>,
    /// 基础价格上限（分）
    pub max_price: Option<i64>,
}

/// 商品列表排序
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductSort {
    /// updated_at desc, created_at desc
    #[default]
    Featured,
    /// created_at desc
    Newest,
    PriceAsc,
    PriceDesc,
}

/// 追踪链接列表过滤条件
#[derive(Default, Clone, Debug)]
pub struct TrackerFilter {
    /// 模糊搜索 code / label / medium
    pub search: Option<String>,
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// 分页 COUNT 缓存（TTL 30秒）
    count_cache: Cache<String, u64>,
    /// 重试配置
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(
        database_url: &str,
        backend_name: &str,
        config: &DatabaseConfig,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(ClarocheError::database_config(
                "DATABASE_URL 未设置".to_string(),
            ));
        }

        let retry_config = retry::RetryConfig {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        };

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, config.pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            count_cache: Cache::builder()
                .time_to_live(Duration::from_secs(30))
                .max_capacity(100)
                .build(),
            retry_config,
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接（用于测试等需要直接访问数据库的场景）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 清除分页 COUNT 缓存（数据变更时调用）
    pub fn invalidate_count_cache(&self) {
        self.count_cache.invalidate_all();
    }
}
