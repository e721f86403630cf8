//! Add-to-cart event operations for SeaOrmStorage

use sea_orm::ActiveValue::Set;
use sea_orm::EntityTrait;
use tracing::debug;

use super::{SeaOrmStorage, retry};
use crate::errors::{ClarocheError, Result};

use migration::entities::add_to_cart_event;

impl SeaOrmStorage {
    /// 追加一条 add-to-cart 事件（可选归因到 tracker）
    pub async fn insert_add_to_cart_event(
        &self,
        product_id: i64,
        variant_id: Option<i64>,
        tracker_id: Option<i64>,
    ) -> Result<()> {
        let db = &self.db;
        let am = add_to_cart_event::ActiveModel {
            product_id: Set(product_id),
            variant_id: Set(variant_id),
            tracker_id: Set(tracker_id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        retry::with_retry("insert_add_to_cart_event", self.retry_config, || async {
            add_to_cart_event::Entity::insert(am.clone()).exec(db).await
        })
        .await
        .map_err(|e| ClarocheError::database_operation(format!("事件插入失败: {}", e)))?;

        debug!(
            "Add-to-cart event recorded: product={}, variant={:?}, tracker={:?}",
            product_id, variant_id, tracker_id
        );
        Ok(())
    }
}
