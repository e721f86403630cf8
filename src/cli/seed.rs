//! Demo catalog seeding
//!
//! Loads a small activewear catalog with variants, reviews, and one
//! campaign link per product, so a fresh database has something to browse.

use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::services::{CreateTrackerRequest, LinkService};
use crate::storage::backend::{NewProduct, NewReview, NewVariant};
use crate::storage::{LinkTarget, ReviewStatus, SeaOrmStorage};

struct SeedVariant {
    name: &'static str,
    sku: &'static str,
    price: i64,
    stock: i32,
    size: &'static str,
    color: &'static str,
}

struct SeedReview {
    rating: i32,
    title: &'static str,
    body: &'static str,
    status: ReviewStatus,
    author_name: &'static str,
}

struct SeedProduct {
    title: &'static str,
    slug: &'static str,
    description: &'static str,
    price: i64,
    variants: &'static [SeedVariant],
    reviews: &'static [SeedReview],
    /// (label, medium, target)
    link: (&'static str, &'static str, LinkTarget),
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        title: "Aurora Silk Blouse",
        slug: "aurora-silk-blouse",
        description: "Fluid silk blouse with a relaxed drape, hidden placket, and pearlescent buttons crafted for effortless layering.",
        price: 14900,
        variants: &[
            SeedVariant {
                name: "Ivory / XS",
                sku: "BL-AURORA-IVORY-XS",
                price: 14900,
                stock: 8,
                size: "XS",
                color: "Ivory",
            },
            SeedVariant {
                name: "Ivory / S",
                sku: "BL-AURORA-IVORY-S",
                price: 14900,
                stock: 14,
                size: "S",
                color: "Ivory",
            },
        ],
        reviews: &[
            SeedReview {
                rating: 5,
                title: "Ultra soft and polished",
                body: "The fabric feels luxurious and the color saturation is gorgeous.",
                status: ReviewStatus::Approved,
                author_name: "Sienna Park",
            },
            SeedReview {
                rating: 4,
                title: "Great drape",
                body: "Love the way this blouse falls but sizing runs a touch generous.",
                status: ReviewStatus::Pending,
                author_name: "Dana Cho",
            },
        ],
        link: ("Instagram Editorial", "social", LinkTarget::AddToCart),
    },
    SeedProduct {
        title: "Midnight Tailored Blazer",
        slug: "midnight-tailored-blazer",
        description: "Structured wool blend blazer with sculpted shoulders, satin lining, and tonal horn buttons.",
        price: 27900,
        variants: &[
            SeedVariant {
                name: "Navy / 36",
                sku: "BLZ-MIDNIGHT-NAVY-36",
                price: 27900,
                stock: 6,
                size: "36",
                color: "Navy",
            },
            SeedVariant {
                name: "Charcoal / 40",
                sku: "BLZ-MIDNIGHT-CHARCOAL-40",
                price: 27900,
                stock: 7,
                size: "40",
                color: "Charcoal",
            },
        ],
        reviews: &[SeedReview {
            rating: 5,
            title: "Tailoring perfection",
            body: "Sharp lines and the interior pocketing is so thoughtful.",
            status: ReviewStatus::Approved,
            author_name: "Rory Patel",
        }],
        link: ("Press Feature", "press", LinkTarget::Pdp),
    },
    SeedProduct {
        title: "Velocity Running Tights",
        slug: "velocity-running-tights",
        description: "High-rise compression tights with bonded seams, a zip back pocket, and reflective detailing for low-light runs.",
        price: 9800,
        variants: &[
            SeedVariant {
                name: "Black / S",
                sku: "TG-VELOCITY-BLACK-S",
                price: 9800,
                stock: 22,
                size: "S",
                color: "Black",
            },
            SeedVariant {
                name: "Black / M",
                sku: "TG-VELOCITY-BLACK-M",
                price: 9800,
                stock: 18,
                size: "M",
                color: "Black",
            },
            SeedVariant {
                name: "Plum / M",
                sku: "TG-VELOCITY-PLUM-M",
                price: 10400,
                stock: 9,
                size: "M",
                color: "Plum",
            },
        ],
        reviews: &[
            SeedReview {
                rating: 5,
                title: "Second skin",
                body: "Stays put through intervals and the pocket actually fits a phone.",
                status: ReviewStatus::Approved,
                author_name: "Maya Lindqvist",
            },
            SeedReview {
                rating: 3,
                title: "Runs warm",
                body: "Great compression but I would not wear these for summer training.",
                status: ReviewStatus::Approved,
                author_name: "Jess Okafor",
            },
        ],
        link: ("Newsletter Launch", "email", LinkTarget::AddToCart),
    },
];

/// 灌入演示目录（商品已存在则跳过该商品）
pub async fn seed_demo_catalog(
    storage: &Arc<SeaOrmStorage>,
    link_service: &LinkService,
) -> Result<()> {
    let mut created = 0usize;

    for seed in CATALOG {
        if storage.find_product_by_slug(seed.slug).await?.is_some() {
            info!("Seed: product '{}' already exists, skipping", seed.slug);
            continue;
        }

        let product = storage
            .insert_product(NewProduct {
                slug: seed.slug.to_string(),
                title: seed.title.to_string(),
                description: Some(seed.description.to_string()),
                price: seed.price,
                currency: "USD".to_string(),
                thumbnail_url: None,
                status: "PUBLISHED".to_string(),
            })
            .await?;

        let mut first_variant_id = None;
        for variant in seed.variants {
            let created_variant = storage
                .insert_variant(NewVariant {
                    product_id: product.id,
                    name: variant.name.to_string(),
                    sku: Some(variant.sku.to_string()),
                    price: variant.price,
                    stock: variant.stock,
                    size: Some(variant.size.to_string()),
                    color: Some(variant.color.to_string()),
                    image_url: None,
                })
                .await?;
            first_variant_id.get_or_insert(created_variant.id);
        }

        for review in seed.reviews {
            storage
                .insert_review(NewReview {
                    product_id: product.id,
                    rating: review.rating,
                    title: Some(review.title.to_string()),
                    body: review.body.to_string(),
                    status: review.status,
                    author_name: review.author_name.to_string(),
                    author_email: None,
                })
                .await?;
        }

        let (label, medium, target) = seed.link;
        let tracker = link_service
            .create_tracker(CreateTrackerRequest {
                product_id: product.id,
                variant_id: match target {
                    LinkTarget::AddToCart => first_variant_id,
                    LinkTarget::Pdp => None,
                },
                label: label.to_string(),
                medium: Some(medium.to_string()),
                target,
                redirect_to: None,
            })
            .await?;

        info!(
            "Seed: created '{}' with tracker {} -> {}",
            seed.slug, tracker.code, tracker.url
        );
        created += 1;
    }

    info!("Seed complete: {} products created", created);
    Ok(())
}
