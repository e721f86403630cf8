//! Shopper cart store
//!
//! Maintains the shopper's working selection between page loads within one
//! browsing session. The store is an explicitly constructed object owned by
//! the storefront runtime — persistence is pluggable, and every mutation
//! notifies subscribers synchronously.
//!
//! Known limitation: there is no cross-process synchronization. Two store
//! instances over the same snapshot file will overwrite each other,
//! last-write-wins, exactly like two browser tabs over the same storage key.

mod persistence;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use persistence::{CartPersistence, JsonFileCart, MemoryCart};

/// 购物车行项目，按 (product_id, variant_id) 去重
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub product_id: i64,
    pub variant_id: i64,
    pub name: String,
    /// Price in integer minor units
    pub price: i64,
    pub quantity: u32,
    pub image_url: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// 购物车快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    /// Unix 毫秒时间戳
    pub updated_at: i64,
}

impl CartSnapshot {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// 小计与数量合计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: i64,
    pub item_count: u32,
}

/// 单行小计
pub fn line_total(item: &CartItem) -> i64 {
    item.price * item.quantity as i64
}

/// 快照合计
pub fn cart_totals(snapshot: &CartSnapshot) -> CartTotals {
    snapshot.items.iter().fold(
        CartTotals {
            subtotal: 0,
            item_count: 0,
        },
        |mut acc, item| {
            acc.subtotal += line_total(item);
            acc.item_count += item.quantity;
            acc
        },
    )
}

/// 订阅句柄，用于退订
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type CartListener = Box<dyn Fn(&CartSnapshot) + Send + Sync>;

/// Cart store over a pluggable persistence backend
pub struct CartStore {
    persistence: Box<dyn CartPersistence>,
    /// 持久化失败后的内存回退快照（不落盘，进程内有效）
    fallback: Mutex<Option<CartSnapshot>>,
    listeners: Mutex<Vec<(SubscriptionId, CartListener)>>,
    next_subscription: std::sync::atomic::AtomicU64,
}

impl CartStore {
    pub fn new(persistence: Box<dyn CartPersistence>) -> Self {
        Self {
            persistence,
            fallback: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            next_subscription: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// 读取当前快照
    ///
    /// 无已存状态或已存状态损坏时返回空快照（防御式解析回退）。
    /// 持久化不可用时返回内存回退快照。
    pub fn read(&self) -> CartSnapshot {
        if let Some(ref fallback) = *self.fallback.lock() {
            return fallback.clone();
        }

        match self.persistence.load() {
            Ok(Some(raw)) => match serde_json::from_str::<CartSnapshot>(&raw) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Stored cart state is malformed, starting empty: {}", e);
                    CartSnapshot::empty()
                }
            },
            Ok(None) => CartSnapshot::empty(),
            Err(e) => {
                warn!("Cart persistence unavailable, using empty snapshot: {}", e);
                CartSnapshot::empty()
            }
        }
    }

    /// 添加行项目
    ///
    /// 同 (product_id, variant_id) 已存在时数量累加，price/name 以本次为准
    /// （重复添加时刷新价格），image/size/color 仅在本次提供时覆盖。
    pub fn add_item(&self, item: CartItem) {
        let mut cart = self.read();

        match cart
            .items
            .iter_mut()
            .find(|existing| {
                existing.product_id == item.product_id && existing.variant_id == item.variant_id
            })
        {
            Some(existing) => {
                existing.quantity += item.quantity;
                existing.price = item.price;
                existing.name = item.name;
                if item.image_url.is_some() {
                    existing.image_url = item.image_url;
                }
                if item.size.is_some() {
                    existing.size = item.size;
                }
                if item.color.is_some() {
                    existing.color = item.color;
                }
            }
            None => cart.items.push(item),
        }

        self.commit(cart);
    }

    /// 设置行数量；结果 ≤ 0 时整行删除（不保留零行）
    pub fn set_item_quantity(&self, product_id: i64, variant_id: i64, quantity: u32) {
        let mut cart = self.read();

        for item in cart.items.iter_mut() {
            if item.product_id == product_id && item.variant_id == variant_id {
                item.quantity = quantity;
            }
        }
        cart.items.retain(|item| item.quantity > 0);

        self.commit(cart);
    }

    /// 删除一行
    pub fn remove_item(&self, product_id: i64, variant_id: i64) {
        let mut cart = self.read();
        cart.items
            .retain(|item| !(item.product_id == product_id && item.variant_id == variant_id));
        self.commit(cart);
    }

    /// 清空购物车
    pub fn clear(&self) {
        self.commit(CartSnapshot::empty());
    }

    /// 当前合计
    pub fn totals(&self) -> CartTotals {
        cart_totals(&self.read())
    }

    /// 注册变更回调；每次成功变更同步触发，无批处理
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&CartSnapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(
            self.next_subscription
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst),
        );
        self.listeners.lock().push((id, Box::new(listener)));
        id
    }

    /// 退订
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    /// 持久化 + 通知
    ///
    /// 写入失败时购物车降级为内存态：后续读写都走进程内回退快照，
    /// 进程退出即丢失。这是显式记录的失败模式，而非静默吞掉。
    fn commit(&self, mut cart: CartSnapshot) {
        cart.updated_at = chrono::Utc::now().timestamp_millis();

        let payload = match serde_json::to_string(&cart) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Cart snapshot serialization failed: {}", e);
                None
            }
        };

        let persisted = match payload {
            Some(ref payload) => match self.persistence.store(payload) {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        "Cart persistence write failed, degrading to in-memory state: {}",
                        e
                    );
                    false
                }
            },
            None => false,
        };

        *self.fallback.lock() = if persisted { None } else { Some(cart.clone()) };

        // 监听器回调不持有 fallback 锁，可以安全地再读快照
        for (_, listener) in self.listeners.lock().iter() {
            listener(&cart);
        }
    }
}
