//! Landing-flow simulator
//!
//! Drives the full attribution state machine against a running server the
//! way the storefront runtime would: resolve the tracked URL's payload,
//! record the hit, auto-add the variant into the local cart, and report
//! the sanitized URL and redirect target.

use std::sync::Arc;

use tracing::warn;

use crate::attribution::{
    AttributionHandler, HttpTrackingClient, LinkAddPayload, PayloadVariant, SessionMarkers,
    TrackingClient,
};
use crate::cart::{CartStore, JsonFileCart, MemoryCart};
use crate::config::StaticConfig;
use crate::errors::Result;
use crate::storage::{SeaOrmStorage, StorageFactory};

/// 默认购物车快照文件
const DEFAULT_CART_FILE: &str = ".claroche-cart.json";

/// 模拟一次追踪链接落地
pub async fn simulate_landing(config: &StaticConfig, landing_url: &str) -> Result<()> {
    let storage = StorageFactory::create(&config.database).await?;

    let payload = resolve_payload(&storage, landing_url).await?;

    let cart_file = config
        .cart
        .file
        .clone()
        .unwrap_or_else(|| DEFAULT_CART_FILE.to_string());
    let cart = Arc::new(CartStore::new(if cart_file.is_empty() {
        Box::new(MemoryCart::new())
    } else {
        Box::new(JsonFileCart::new(&cart_file))
    }));

    let markers = Arc::new(SessionMarkers::new());
    let tracking = Arc::new(HttpTrackingClient::new(&config.site.base_url));

    let handler = AttributionHandler::new(
        Arc::clone(&cart),
        markers,
        tracking as Arc<dyn TrackingClient>,
    );

    // 追踪上报是同步 HTTP，放到阻塞线程池执行
    let url = landing_url.to_string();
    let outcome = tokio::task::spawn_blocking(move || handler.process(&url, payload.as_ref()))
        .await
        .map_err(|e| crate::errors::ClarocheError::validation(format!("landing 任务失败: {}", e)))?;

    if let Some(ref item) = outcome.added_item {
        println!("added to cart: {} x{} @ {}", item.name, item.quantity, item.price);
    } else {
        println!("no auto-add performed");
    }
    if let Some(ref sanitized) = outcome.sanitized_url {
        println!("visible url:   {}", sanitized);
    }
    if let Some(ref redirect) = outcome.redirect_to {
        println!("redirect to:   {}", redirect);
    }

    let totals = cart.totals();
    println!(
        "cart totals:   {} items, subtotal {}",
        totals.item_count, totals.subtotal
    );

    Ok(())
}

/// 从落地 URL 的 add/variant/redirect 参数解析出追踪载荷
///
/// 服务端渲染在真实 storefront 里做同样的解析；这里直接查库。
async fn resolve_payload(
    storage: &Arc<SeaOrmStorage>,
    landing_url: &str,
) -> Result<Option<LinkAddPayload>> {
    let Some(parsed) = parse_lenient(landing_url) else {
        return Ok(None);
    };

    let param = |key: &str| {
        parsed
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    };

    let Some(product_id) = param("add").and_then(|v| v.parse::<i64>().ok()) else {
        return Ok(None);
    };

    let Some(product) = storage.find_product(product_id).await? else {
        warn!("Landing references unknown product {}", product_id);
        return Ok(None);
    };

    let variant = match param("variant").and_then(|v| v.parse::<i64>().ok()) {
        Some(variant_id) => storage.find_variant(variant_id).await?.map(|v| PayloadVariant {
            id: v.id,
            name: v.name,
            price: v.price,
            stock: v.stock,
            size: v.size,
            color: v.color,
            image_url: v.image_url,
        }),
        None => None,
    };

    Ok(Some(LinkAddPayload {
        product_id: product.id,
        product_title: product.title,
        product_slug: product.slug,
        tracker_code: param("ref"),
        variant,
        redirect: param("redirect"),
    }))
}

fn parse_lenient(url: &str) -> Option<url::Url> {
    if let Ok(parsed) = url::Url::parse(url) {
        return Some(parsed);
    }
    url::Url::parse("http://localhost").ok()?.join(url).ok()
}
