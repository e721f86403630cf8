//! LinkService tests
//!
//! Tracker creation, code lookup, hit recording, and the admin listing,
//! against a temporary SQLite database.

use std::collections::HashSet;
use std::sync::Arc;

use claroche::config::{DatabaseConfig, SiteConfig};
use claroche::errors::ClarocheError;
use claroche::services::{
    AdminLinkQuery, CreateTrackerRequest, LinkService, RecordHitRequest,
};
use claroche::storage::backend::{NewProduct, NewVariant};
use claroche::storage::{LinkTarget, SeaOrmStorage, StorageFactory};
use claroche::utils::CODE_ALPHABET;
use tempfile::TempDir;

// =============================================================================
// Test Setup
// =============================================================================

async fn create_test_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("claroche-test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let storage = StorageFactory::create(&config)
        .await
        .expect("Failed to create test storage");
    (storage, dir)
}

async fn create_test_service() -> (LinkService, Arc<SeaOrmStorage>, TempDir) {
    let (storage, dir) = create_test_storage().await;
    let service = LinkService::new(storage.clone(), SiteConfig::default());
    (service, storage, dir)
}

async fn seed_product(storage: &SeaOrmStorage, slug: &str, price: i64) -> (i64, i64) {
    let product = storage
        .insert_product(NewProduct {
            slug: slug.to_string(),
            title: format!("Product {}", slug),
            description: None,
            price,
            currency: "USD".to_string(),
            thumbnail_url: None,
            status: "PUBLISHED".to_string(),
        })
        .await
        .unwrap();

    let variant = storage
        .insert_variant(NewVariant {
            product_id: product.id,
            name: "Ivory / S".to_string(),
            sku: None,
            price,
            stock: 5,
            size: Some("S".to_string()),
            color: Some("Ivory".to_string()),
            image_url: None,
        })
        .await
        .unwrap();

    (product.id, variant.id)
}

fn tracker_request(product_id: i64, variant_id: Option<i64>, target: LinkTarget) -> CreateTrackerRequest {
    CreateTrackerRequest {
        product_id,
        variant_id,
        label: "Instagram Editorial".to_string(),
        medium: Some("social".to_string()),
        target,
        redirect_to: None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_create_tracker_generates_valid_code() {
    let (service, storage, _dir) = create_test_service().await;
    let (product_id, variant_id) = seed_product(&storage, "aurora-silk-blouse", 14900).await;

    let tracker = service
        .create_tracker(tracker_request(product_id, Some(variant_id), LinkTarget::AddToCart))
        .await
        .unwrap();

    assert_eq!(tracker.code.len(), 6);
    let valid: HashSet<u8> = CODE_ALPHABET.iter().copied().collect();
    for b in tracker.code.bytes() {
        assert!(valid.contains(&b), "Invalid code byte: {}", b as char);
    }
}

#[tokio::test]
async fn test_create_tracker_builds_add_to_cart_url() {
    let (service, storage, _dir) = create_test_service().await;
    let (product_id, variant_id) = seed_product(&storage, "aurora-silk-blouse", 14900).await;

    let tracker = service
        .create_tracker(tracker_request(product_id, Some(variant_id), LinkTarget::AddToCart))
        .await
        .unwrap();

    assert!(tracker.url.starts_with("http://localhost:8080/shop?"));
    assert!(tracker.url.contains(&format!("add={}", product_id)));
    assert!(tracker.url.contains(&format!("ref={}", tracker.code)));
    assert!(tracker.url.contains(&format!("variant={}", variant_id)));
}

#[tokio::test]
async fn test_create_tracker_builds_pdp_url() {
    let (service, storage, _dir) = create_test_service().await;
    let (product_id, _) = seed_product(&storage, "midnight-tailored-blazer", 27900).await;

    let tracker = service
        .create_tracker(tracker_request(product_id, None, LinkTarget::Pdp))
        .await
        .unwrap();

    assert!(
        tracker
            .url
            .starts_with("http://localhost:8080/product/midnight-tailored-blazer?")
    );
    assert!(tracker.url.contains(&format!("ref={}", tracker.code)));
}

#[tokio::test]
async fn test_create_tracker_unknown_product() {
    let (service, _storage, _dir) = create_test_service().await;

    let result = service
        .create_tracker(tracker_request(999, None, LinkTarget::Pdp))
        .await;

    assert!(matches!(result, Err(ClarocheError::NotFound(_))));
}

#[tokio::test]
async fn test_create_tracker_variant_must_belong_to_product() {
    let (service, storage, _dir) = create_test_service().await;
    let (product_a, _) = seed_product(&storage, "product-a", 1000).await;
    let (_, variant_b) = seed_product(&storage, "product-b", 2000).await;

    let result = service
        .create_tracker(tracker_request(product_a, Some(variant_b), LinkTarget::AddToCart))
        .await;

    assert!(matches!(result, Err(ClarocheError::Validation(_))));
}

#[tokio::test]
async fn test_find_by_code_normalizes_case() {
    let (service, storage, _dir) = create_test_service().await;
    let (product_id, variant_id) = seed_product(&storage, "aurora-silk-blouse", 14900).await;

    let tracker = service
        .create_tracker(tracker_request(product_id, Some(variant_id), LinkTarget::AddToCart))
        .await
        .unwrap();

    let found = service
        .find_by_code(&tracker.code.to_lowercase())
        .await
        .unwrap();
    assert_eq!(found.unwrap().id, tracker.id);
}

#[tokio::test]
async fn test_find_by_code_unknown_returns_none() {
    let (service, _storage, _dir) = create_test_service().await;
    assert!(service.find_by_code("ZZZZZZ").await.unwrap().is_none());
}

#[tokio::test]
async fn test_record_hit_unknown_code_creates_no_row() {
    let (service, storage, _dir) = create_test_service().await;

    let result = service
        .record_hit(RecordHitRequest {
            code: "ZZZZZZ".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(storage.tracking_stats().await.total_hits, 0);
}

#[tokio::test]
async fn test_record_hit_appends_row_per_call() {
    let (service, storage, _dir) = create_test_service().await;
    let (product_id, variant_id) = seed_product(&storage, "aurora-silk-blouse", 14900).await;

    let tracker = service
        .create_tracker(tracker_request(product_id, Some(variant_id), LinkTarget::AddToCart))
        .await
        .unwrap();

    // 服务端不去重：同一短码两次调用产生两条命中行
    for _ in 0..2 {
        let recorded = service
            .record_hit(RecordHitRequest {
                code: tracker.code.clone(),
                ip_address: Some("203.0.113.7".to_string()),
                user_agent: Some("Mozilla/5.0".to_string()),
                referer: Some("https://instagram.com/".to_string()),
            })
            .await
            .unwrap();
        assert!(recorded.is_some());
    }

    let counts = storage.hit_counts(&[tracker.id]).await.unwrap();
    assert_eq!(counts.get(&tracker.id), Some(&2));
}

#[tokio::test]
async fn test_admin_listing_includes_hits_and_product_info() {
    let (service, storage, _dir) = create_test_service().await;
    let (product_id, variant_id) = seed_product(&storage, "aurora-silk-blouse", 14900).await;

    let tracker = service
        .create_tracker(tracker_request(product_id, Some(variant_id), LinkTarget::AddToCart))
        .await
        .unwrap();

    service
        .record_hit(RecordHitRequest {
            code: tracker.code.clone(),
            ..Default::default()
        })
        .await
        .unwrap();

    let page = service
        .list_admin_links(AdminLinkQuery {
            search: None,
            page: 1,
            page_size: 20,
        })
        .await
        .unwrap();

    assert_eq!(page.total_items, 1);
    assert_eq!(page.items.len(), 1);
    let item = &page.items[0];
    assert_eq!(item.code, tracker.code);
    assert_eq!(item.product_slug, "aurora-silk-blouse");
    assert_eq!(item.variant_name.as_deref(), Some("Ivory / S"));
    assert_eq!(item.hits, 1);
}

#[tokio::test]
async fn test_admin_listing_search_filters() {
    let (service, storage, _dir) = create_test_service().await;
    let (product_id, _) = seed_product(&storage, "aurora-silk-blouse", 14900).await;

    service
        .create_tracker(CreateTrackerRequest {
            product_id,
            variant_id: None,
            label: "Instagram Editorial".to_string(),
            medium: Some("social".to_string()),
            target: LinkTarget::Pdp,
            redirect_to: None,
        })
        .await
        .unwrap();
    service
        .create_tracker(CreateTrackerRequest {
            product_id,
            variant_id: None,
            label: "Press Feature".to_string(),
            medium: Some("press".to_string()),
            target: LinkTarget::Pdp,
            redirect_to: None,
        })
        .await
        .unwrap();

    let page = service
        .list_admin_links(AdminLinkQuery {
            search: Some("Press".to_string()),
            page: 1,
            page_size: 20,
        })
        .await
        .unwrap();

    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].label, "Press Feature");
}

#[tokio::test]
async fn test_admin_listing_clamps_page_size() {
    let (service, _storage, _dir) = create_test_service().await;

    let page = service
        .list_admin_links(AdminLinkQuery {
            search: None,
            page: 0,
            page_size: 1000,
        })
        .await
        .unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 100);
}

#[tokio::test]
async fn test_stats_counts_all_tables() {
    let (service, storage, _dir) = create_test_service().await;
    let (product_id, variant_id) = seed_product(&storage, "aurora-silk-blouse", 14900).await;

    let tracker = service
        .create_tracker(tracker_request(product_id, Some(variant_id), LinkTarget::AddToCart))
        .await
        .unwrap();
    service
        .record_hit(RecordHitRequest {
            code: tracker.code.clone(),
            ..Default::default()
        })
        .await
        .unwrap();
    storage
        .insert_add_to_cart_event(product_id, Some(variant_id), Some(tracker.id))
        .await
        .unwrap();

    let stats = service.stats().await;
    assert_eq!(stats.total_trackers, 1);
    assert_eq!(stats.total_hits, 1);
    assert_eq!(stats.total_add_to_cart_events, 1);
}
