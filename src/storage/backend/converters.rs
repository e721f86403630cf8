use std::str::FromStr;

use crate::storage::models::{
    LinkTarget, LinkTracker, Product, ProductStatus, Review, ReviewStatus, Variant,
};
use migration::entities::{link_tracker, product, review, variant};

/// 将 Sea-ORM Model 转换为 Product
///
/// 未知 status 值按 Draft 处理（不会出现在已发布列表里）。
pub fn model_to_product(model: product::Model) -> Product {
    Product {
        id: model.id,
        slug: model.slug,
        title: model.title,
        description: model.description,
        price: model.price,
        currency: model.currency,
        thumbnail_url: model.thumbnail_url,
        status: ProductStatus::from_str(&model.status).unwrap_or_default(),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn model_to_variant(model: variant::Model) -> Variant {
    Variant {
        id: model.id,
        product_id: model.product_id,
        name: model.name,
        sku: model.sku,
        price: model.price,
        stock: model.stock,
        size: model.size,
        color: model.color,
        image_url: model.image_url,
    }
}

pub fn model_to_review(model: review::Model) -> Review {
    Review {
        id: model.id,
        product_id: model.product_id,
        rating: model.rating,
        title: model.title,
        body: model.body,
        status: ReviewStatus::from_str(&model.status).unwrap_or_default(),
        author_name: model.author_name,
        author_email: model.author_email,
        created_at: model.created_at,
    }
}

pub fn model_to_tracker(model: link_tracker::Model) -> LinkTracker {
    LinkTracker {
        id: model.id,
        code: model.code,
        product_id: model.product_id,
        variant_id: model.variant_id,
        target: LinkTarget::from_str(&model.target).unwrap_or_default(),
        redirect_to: model.redirect_to,
        label: model.label,
        medium: model.medium,
        url: model.url,
        created_at: model.created_at,
    }
}
