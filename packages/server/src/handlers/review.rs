use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{like, review};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::product::{find_product, list_product_reviews};
use crate::models::review::{
    CreateReviewRequest, LikeResponse, ReviewResponse, validate_create_review,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/reviews",
    tag = "Reviews",
    operation_id = "createReview",
    summary = "Review a product",
    description = "Rating is an integer from 1 to 5; the comment must be non-empty. A user may \
        leave multiple reviews on the same product.",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn create_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_review(&payload)?;

    find_product(&state.db, id).await?;

    let model = review::ActiveModel {
        user_id: Set(auth_user.user_id),
        product_id: Set(id),
        rating: Set(payload.rating),
        comment: Set(payload.comment.trim().to_string()),
        likes: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse::from_model(model, auth_user.username)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/reviews",
    tag = "Reviews",
    operation_id = "listReviews",
    summary = "List a product's reviews",
    description = "Public. Oldest first.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Reviews", body = [ReviewResponse]),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    find_product(&state.db, id).await?;
    let reviews = list_product_reviews(&state.db, id).await?;
    Ok(Json(reviews))
}

#[utoipa::path(
    post,
    path = "/{id}/like",
    tag = "Reviews",
    operation_id = "likeReview",
    summary = "Like a review",
    description = "Idempotent: liking the same review twice is a no-op and reports `liked: false`.",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Like state", body = LikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Review not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn like_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LikeResponse>, AppError> {
    let txn = state.db.begin().await?;

    // Lock the review row so the counter and the like row move together.
    let review = review::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".into()))?;

    let insert = like::Entity::insert(like::ActiveModel {
        user_id: Set(auth_user.user_id),
        review_id: Set(id),
        created_at: Set(chrono::Utc::now()),
    })
    .on_conflict(
        OnConflict::columns([like::Column::UserId, like::Column::ReviewId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await;

    let (liked, likes) = match insert {
        Ok(_) => {
            let likes = review.likes + 1;
            let mut active: review::ActiveModel = review.into();
            active.likes = Set(likes);
            active.update(&txn).await?;
            (true, likes)
        }
        // Conflict: this user already liked the review.
        Err(DbErr::RecordNotInserted) => (false, review.likes),
        Err(e) => return Err(e.into()),
    };

    txn.commit().await?;

    Ok(Json(LikeResponse { liked, likes }))
}
