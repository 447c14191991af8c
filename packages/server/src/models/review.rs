use serde::{Deserialize, Serialize};

use crate::entity::review;
use crate::error::AppError;

/// Maximum review comment length.
pub const MAX_COMMENT_LEN: usize = 500;

/// Request body for creating a review.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    /// Star rating, 1-5.
    #[schema(example = 4)]
    pub rating: i32,
    #[schema(example = "Well worth the price.")]
    pub comment: String,
}

pub fn validate_create_review(payload: &CreateReviewRequest) -> Result<(), AppError> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::Validation("Rating must be between 1 and 5".into()));
    }
    if payload.comment.trim().is_empty() {
        return Err(AppError::Validation("Comment must not be empty".into()));
    }
    if payload.comment.chars().count() > MAX_COMMENT_LEN {
        return Err(AppError::Validation(format!(
            "Comment must be at most {MAX_COMMENT_LEN} characters"
        )));
    }
    Ok(())
}

/// A review as shown on a product page.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub user_id: i32,
    /// Reviewer's username.
    pub username: String,
    pub rating: i32,
    pub comment: String,
    /// Current like count.
    pub likes: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ReviewResponse {
    pub fn from_model(m: review::Model, username: String) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            username,
            rating: m.rating,
            comment: m.comment,
            likes: m.likes,
            created_at: m.created_at,
        }
    }
}

/// Response to a like request.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    /// Whether this request added a new like (`false` for a repeat like).
    pub liked: bool,
    /// Like count after the request.
    pub likes: i32,
}
