//! ProductQueryService tests
//!
//! Facet filtering, pagination, sorting, and the derived per-item fields,
//! against a temporary SQLite database.

use std::sync::Arc;

use claroche::config::DatabaseConfig;
use claroche::services::{ProductListParams, ProductQueryService, SortOption};
use claroche::storage::backend::{NewProduct, NewReview, NewVariant};
use claroche::storage::{ReviewStatus, SeaOrmStorage, StorageFactory};
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

async fn insert_product(
    storage: &SeaOrmStorage,
    slug: &str,
    price: i64,
    status: &str,
    variants: &[(&str, i64, Option<&str>, Option<&str>)],
) -> i64 {
    let product = storage
        .insert_product(NewProduct {
            slug: slug.to_string(),
            title: format!("Product {}", slug),
            description: None,
            price,
            currency: "USD".to_string(),
            thumbnail_url: None,
            status: status.to_string(),
        })
        .await
        .unwrap();

    for (name, variant_price, size, color) in variants {
        storage
            .insert_variant(NewVariant {
                product_id: product.id,
                name: name.to_string(),
                sku: None,
                price: *variant_price,
                stock: 10,
                size: size.map(String::from),
                color: color.map(String::from),
                image_url: None,
            })
            .await
            .unwrap();
    }

    product.id
}

async fn insert_review(storage: &SeaOrmStorage, product_id: i64, rating: i32, status: ReviewStatus) {
    storage
        .insert_review(NewReview {
            product_id,
            rating,
            title: None,
            body: "A perfectly serviceable piece of activewear indeed.".to_string(),
            status,
            author_name: "Sienna Park".to_string(),
            author_email: None,
        })
        .await
        .unwrap();
}

fn params() -> ProductListParams {
    ProductListParams::default()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_size_filter_matches_any_variant() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    insert_product(
        &storage,
        "aurora-silk-blouse",
        14900,
        "PUBLISHED",
        &[
            ("Ivory / S", 14900, Some("S"), Some("Ivory")),
            ("Ivory / M", 14900, Some("M"), Some("Ivory")),
        ],
    )
    .await;

    for size in ["S", "M"] {
        let response = service
            .product_list(ProductListParams {
                sizes: vec![size.to_string()],
                ..params()
            })
            .await
            .unwrap();
        assert_eq!(response.items.len(), 1, "size={} must match", size);
    }

    let response = service
        .product_list(ProductListParams {
            sizes: vec!["L".to_string()],
            ..params()
        })
        .await
        .unwrap();
    assert!(response.items.is_empty(), "size=L must not match");
}

#[tokio::test]
async fn test_color_filter_matches_any_variant() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    insert_product(
        &storage,
        "velocity-running-tights",
        9800,
        "PUBLISHED",
        &[
            ("Black / S", 9800, Some("S"), Some("Black")),
            ("Plum / M", 10400, Some("M"), Some("Plum")),
        ],
    )
    .await;

    let response = service
        .product_list(ProductListParams {
            colors: vec!["Plum".to_string()],
            ..params()
        })
        .await
        .unwrap();
    assert_eq!(response.items.len(), 1);

    let response = service
        .product_list(ProductListParams {
            colors: vec!["Chartreuse".to_string()],
            ..params()
        })
        .await
        .unwrap();
    assert!(response.items.is_empty());
}

#[tokio::test]
async fn test_draft_products_excluded() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    insert_product(&storage, "published-item", 10000, "PUBLISHED", &[]).await;
    insert_product(&storage, "draft-item", 5000, "DRAFT", &[]).await;

    let response = service.product_list(params()).await.unwrap();
    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].slug, "published-item");
}

#[tokio::test]
async fn test_price_bounds_filter() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    insert_product(&storage, "cheap", 5000, "PUBLISHED", &[]).await;
    insert_product(&storage, "mid", 15000, "PUBLISHED", &[]).await;
    insert_product(&storage, "expensive", 30000, "PUBLISHED", &[]).await;

    let response = service
        .product_list(ProductListParams {
            min_price: Some(6000),
            max_price: Some(20000),
            ..params()
        })
        .await
        .unwrap();

    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].slug, "mid");

    // 只有下限
    let response = service
        .product_list(ProductListParams {
            min_price: Some(6000),
            ..params()
        })
        .await
        .unwrap();
    assert_eq!(response.items.len(), 2);
}

#[tokio::test]
async fn test_pagination_take_plus_one_derives_next_page() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    for i in 0..5 {
        insert_product(&storage, &format!("item-{}", i), 1000 * (i + 1), "PUBLISHED", &[]).await;
    }

    let page1 = service
        .product_list(ProductListParams {
            take: Some(2),
            page: Some(1),
            ..params()
        })
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 2);
    assert!(page1.page_info.has_next_page);
    assert!(!page1.page_info.has_previous_page);
    assert_eq!(page1.page_info.total_items, 5);
    assert_eq!(page1.page_info.total_pages, 3);

    let page3 = service
        .product_list(ProductListParams {
            take: Some(2),
            page: Some(3),
            ..params()
        })
        .await
        .unwrap();
    assert_eq!(page3.items.len(), 1);
    assert!(!page3.page_info.has_next_page);
    assert!(page3.page_info.has_previous_page);
}

#[tokio::test]
async fn test_sort_price_ordering() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    insert_product(&storage, "mid", 15000, "PUBLISHED", &[]).await;
    insert_product(&storage, "cheap", 5000, "PUBLISHED", &[]).await;
    insert_product(&storage, "expensive", 30000, "PUBLISHED", &[]).await;

    let asc = service
        .product_list(ProductListParams {
            sort: Some(SortOption::PriceAsc),
            ..params()
        })
        .await
        .unwrap();
    let slugs: Vec<&str> = asc.items.iter().map(|i| i.slug.as_str()).collect();
    assert_eq!(slugs, ["cheap", "mid", "expensive"]);

    let desc = service
        .product_list(ProductListParams {
            sort: Some(SortOption::PriceDesc),
            ..params()
        })
        .await
        .unwrap();
    let slugs: Vec<&str> = desc.items.iter().map(|i| i.slug.as_str()).collect();
    assert_eq!(slugs, ["expensive", "mid", "cheap"]);
}

#[tokio::test]
async fn test_facets_are_catalog_wide() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    insert_product(
        &storage,
        "blouse",
        14900,
        "PUBLISHED",
        &[("Ivory / S", 14900, Some("S"), Some("Ivory"))],
    )
    .await;
    insert_product(
        &storage,
        "tights",
        9800,
        "PUBLISHED",
        &[("Black / M", 9800, Some("M"), Some("Black"))],
    )
    .await;

    // facet 不随当前过滤变化：按 size=S 过滤时仍然返回全目录 facet
    let response = service
        .product_list(ProductListParams {
            sizes: vec!["S".to_string()],
            ..params()
        })
        .await
        .unwrap();

    assert_eq!(response.facets.sizes, ["M", "S"]);
    assert_eq!(response.facets.colors, ["Black", "Ivory"]);
    assert_eq!(response.facets.price_range.min, Some(9800));
    assert_eq!(response.facets.price_range.max, Some(14900));
}

#[tokio::test]
async fn test_derived_variant_price_range_and_fallback() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    insert_product(
        &storage,
        "tights",
        9800,
        "PUBLISHED",
        &[
            ("Black / S", 9800, Some("S"), Some("Black")),
            ("Plum / M", 10400, Some("M"), Some("Plum")),
        ],
    )
    .await;
    insert_product(&storage, "no-variants", 7500, "PUBLISHED", &[]).await;

    let response = service.product_list(params()).await.unwrap();

    let tights = response.items.iter().find(|i| i.slug == "tights").unwrap();
    assert_eq!(tights.min_variant_price, 9800);
    assert_eq!(tights.max_variant_price, 10400);

    // 无变体时回退到基础价格
    let bare = response
        .items
        .iter()
        .find(|i| i.slug == "no-variants")
        .unwrap();
    assert_eq!(bare.min_variant_price, 7500);
    assert_eq!(bare.max_variant_price, 7500);
}

#[tokio::test]
async fn test_average_rating_approved_only_one_decimal() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    let product_id = insert_product(&storage, "blouse", 14900, "PUBLISHED", &[]).await;
    insert_review(&storage, product_id, 5, ReviewStatus::Approved).await;
    insert_review(&storage, product_id, 4, ReviewStatus::Approved).await;
    insert_review(&storage, product_id, 4, ReviewStatus::Approved).await;
    insert_review(&storage, product_id, 1, ReviewStatus::Pending).await;
    insert_review(&storage, product_id, 1, ReviewStatus::Rejected).await;

    let response = service.product_list(params()).await.unwrap();
    let item = &response.items[0];

    // (5+4+4)/3 = 4.333... → 4.3；pending/rejected 不计入
    assert_eq!(item.average_rating, Some(4.3));
    assert_eq!(item.review_count, 3);
}

#[tokio::test]
async fn test_average_rating_none_without_approved_reviews() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    let product_id = insert_product(&storage, "blouse", 14900, "PUBLISHED", &[]).await;
    insert_review(&storage, product_id, 5, ReviewStatus::Pending).await;

    let response = service.product_list(params()).await.unwrap();
    assert_eq!(response.items[0].average_rating, None);
    assert_eq!(response.items[0].review_count, 0);
}

#[tokio::test]
async fn test_product_by_slug_detail() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage.clone());

    let product_id = insert_product(
        &storage,
        "tights",
        9800,
        "PUBLISHED",
        &[
            ("Plum / M", 10400, Some("M"), Some("Plum")),
            ("Black / S", 9800, Some("S"), Some("Black")),
        ],
    )
    .await;
    insert_review(&storage, product_id, 5, ReviewStatus::Approved).await;
    insert_review(&storage, product_id, 2, ReviewStatus::Pending).await;

    let detail = service.product_by_slug("tights").await.unwrap().unwrap();

    // 变体价格升序
    let prices: Vec<i64> = detail.variants.iter().map(|v| v.price).collect();
    assert_eq!(prices, [9800, 10400]);

    // 只含已审核评论
    assert_eq!(detail.reviews.len(), 1);
    assert_eq!(detail.reviews[0].rating, 5);
}

#[tokio::test]
async fn test_product_by_slug_unknown() {
    let (storage, _dir) = create_test_storage().await;
    let service = ProductQueryService::new(storage);
    assert!(service.product_by_slug("missing").await.unwrap().is_none());
}
