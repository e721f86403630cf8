//! Review submission service
//!
//! Every external review body passes through an explicit validation step
//! producing a typed result: either the created review or a field-level
//! error map. Reviews are always created PENDING; moderation is out of
//! scope here.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{ClarocheError, Result};
use crate::storage::backend::NewReview;
use crate::storage::{Review, ReviewStatus, SeaOrmStorage};

/// 最短评论正文长度
const MIN_BODY_LEN: usize = 20;
/// 最短署名长度
const MIN_NAME_LEN: usize = 2;
/// 最长标题长度
const MAX_TITLE_LEN: usize = 120;

/// 字段级校验错误（field -> message）
pub type FieldErrors = BTreeMap<String, String>;

/// 外部评论提交载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub product_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub rating: i32,
    pub title: Option<String>,
    pub body: String,
}

/// 提交结果：创建成功或校验失败
#[derive(Debug, Clone)]
pub enum ReviewSubmitOutcome {
    Created(Review),
    Invalid(FieldErrors),
}

/// Service for shopper review submission
pub struct ReviewService {
    storage: Arc<SeaOrmStorage>,
}

impl ReviewService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 校验提交载荷
    fn validate(submission: &ReviewSubmission) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if submission.name.trim().len() < MIN_NAME_LEN {
            errors.insert(
                "name".to_string(),
                format!("Name must be at least {} characters", MIN_NAME_LEN),
            );
        }

        if let Some(ref email) = submission.email
            && !email.is_empty()
            && !email.contains('@')
        {
            errors.insert("email".to_string(), "Invalid email address".to_string());
        }

        if !(1..=5).contains(&submission.rating) {
            errors.insert(
                "rating".to_string(),
                "Rating must be between 1 and 5".to_string(),
            );
        }

        if let Some(ref title) = submission.title
            && title.trim().len() > MAX_TITLE_LEN
        {
            errors.insert(
                "title".to_string(),
                format!("Title must be at most {} characters", MAX_TITLE_LEN),
            );
        }

        if submission.body.trim().len() < MIN_BODY_LEN {
            errors.insert(
                "body".to_string(),
                format!("Review must be at least {} characters", MIN_BODY_LEN),
            );
        }

        errors
    }

    /// 提交评论
    pub async fn submit(&self, submission: ReviewSubmission) -> Result<ReviewSubmitOutcome> {
        let errors = Self::validate(&submission);
        if !errors.is_empty() {
            return Ok(ReviewSubmitOutcome::Invalid(errors));
        }

        let product = self.storage.find_product(submission.product_id).await?;
        if product.is_none() {
            return Err(ClarocheError::not_found(format!(
                "Product {} not found",
                submission.product_id
            )));
        }

        let review = self
            .storage
            .insert_review(NewReview {
                product_id: submission.product_id,
                rating: submission.rating,
                title: submission
                    .title
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
                body: submission.body.trim().to_string(),
                status: ReviewStatus::Pending,
                author_name: submission.name.trim().to_string(),
                author_email: submission.email.filter(|e| !e.is_empty()),
            })
            .await?;

        info!(
            "ReviewService: pending review {} for product {}",
            review.id, review.product_id
        );
        Ok(ReviewSubmitOutcome::Created(review))
    }
}
