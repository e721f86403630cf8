//! Add-to-cart event service

use std::sync::Arc;

use tracing::debug;

use crate::errors::{ClarocheError, Result};
use crate::storage::SeaOrmStorage;
use crate::utils::normalize_tracker_code;

/// Service for add-to-cart analytics events
pub struct EventService {
    storage: Arc<SeaOrmStorage>,
}

impl EventService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 记录一次 add-to-cart 事件
    ///
    /// 商品必须存在；tracker_code 未知时事件照常写入但不归因。
    pub async fn record_add_to_cart(
        &self,
        product_id: i64,
        variant_id: Option<i64>,
        tracker_code: Option<&str>,
    ) -> Result<()> {
        let product = self.storage.find_product(product_id).await?;
        if product.is_none() {
            return Err(ClarocheError::not_found(format!(
                "Product {} not found",
                product_id
            )));
        }

        let tracker_id = match tracker_code.filter(|c| !c.is_empty()) {
            Some(code) => {
                let normalized = normalize_tracker_code(code);
                let tracker = self.storage.find_tracker_by_code(&normalized).await?;
                if tracker.is_none() {
                    debug!("Unknown tracker code '{}', event stays unattributed", code);
                }
                tracker.map(|t| t.id)
            }
            None => None,
        };

        self.storage
            .insert_add_to_cart_event(product_id, variant_id, tracker_id)
            .await
    }
}
