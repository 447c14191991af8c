use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{favorite, like, message, product, purchase, review, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::product::{
    ProductListItem, ProductListQuery, ProductListResponse, ProductResponse,
    UpdateProductRequest, validate_update_product,
};
use crate::models::shared::Pagination;
use crate::models::user::UserSummary;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/users",
    tag = "Admin",
    operation_id = "adminListUsers",
    summary = "List all users",
    responses(
        (status = 200, description = "All users", body = [UserSummary]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.user_id))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    auth_user.require_admin()?;

    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "Admin",
    operation_id = "adminListProducts",
    summary = "List all products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "All products", body = ProductListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(admin_id = auth_user.user_id))]
pub async fn list_products(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>, AppError> {
    auth_user.require_admin()?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

    let total = product::Entity::find()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = product::Entity::find()
        .order_by_asc(product::Column::Id)
        .select_only()
        .column(product::Column::Id)
        .column(product::Column::Name)
        .column(product::Column::Price)
        .column(product::Column::UserId)
        .column(product::Column::ImageName)
        .column(product::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<ProductListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(ProductListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    }))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Admin",
    operation_id = "adminDeleteUser",
    summary = "Delete a user and everything they own",
    description = "Removes the user together with their products (and those products' reviews, \
        likes, favorites and purchase records), their own reviews, likes, favorites, purchases \
        and messages. Admins cannot delete their own account. Stored file content is kept; \
        orphaned blobs are reclaimed offline.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Deleting own account (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, admin_id = auth_user.user_id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;

    if id == auth_user.user_id {
        return Err(AppError::Conflict(
            "Admins cannot delete their own account".into(),
        ));
    }

    let txn = state.db.begin().await?;

    user::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    // Likes the user gave: take them back off the counters first.
    let liked_review_ids: Vec<i32> = like::Entity::find()
        .filter(like::Column::UserId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|l| l.review_id)
        .collect();
    if !liked_review_ids.is_empty() {
        review::Entity::update_many()
            .col_expr(
                review::Column::Likes,
                Expr::col(review::Column::Likes).sub(1),
            )
            .filter(review::Column::Id.is_in(liked_review_ids))
            .exec(&txn)
            .await?;
    }
    like::Entity::delete_many()
        .filter(like::Column::UserId.eq(id))
        .exec(&txn)
        .await?;

    // Reviews the user wrote, with the likes other users left on them.
    let own_review_ids: Vec<i32> = review::Entity::find()
        .filter(review::Column::UserId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    if !own_review_ids.is_empty() {
        like::Entity::delete_many()
            .filter(like::Column::ReviewId.is_in(own_review_ids.clone()))
            .exec(&txn)
            .await?;
        review::Entity::delete_many()
            .filter(review::Column::Id.is_in(own_review_ids))
            .exec(&txn)
            .await?;
    }

    favorite::Entity::delete_many()
        .filter(favorite::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    purchase::Entity::delete_many()
        .filter(purchase::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    message::Entity::delete_many()
        .filter(
            Condition::any()
                .add(message::Column::SenderId.eq(id))
                .add(message::Column::RecipientId.eq(id)),
        )
        .exec(&txn)
        .await?;

    // Products the user published, with all records hanging off them.
    let product_ids: Vec<i32> = product::Entity::find()
        .filter(product::Column::UserId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    for product_id in product_ids {
        delete_product_cascade(&txn, product_id).await?;
    }

    user::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(deleted_user_id = id, "user deleted by admin");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Admin",
    operation_id = "adminDeleteProduct",
    summary = "Delete a product",
    description = "Removes the product with its reviews, review likes, favorites and purchase \
        records. Budgets already transferred are not refunded.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, admin_id = auth_user.user_id))]
pub async fn delete_product(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;

    product::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    delete_product_cascade(&txn, id).await?;

    txn.commit().await?;

    tracing::info!(deleted_product_id = id, "product deleted by admin");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/products/{id}",
    tag = "Admin",
    operation_id = "adminUpdateProduct",
    summary = "Edit a product's name or price",
    description = "PATCH semantics: only provided fields are modified. Existing purchase \
        records keep the price that was paid.",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, admin_id = auth_user.user_id))]
pub async fn update_product(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_product(&payload)?;

    let model = product::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let mut active: product::ActiveModel = model.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    let updated = active.update(&state.db).await?;

    Ok(Json(ProductResponse::from(updated)))
}

/// Delete one product and every record that references it. Caller supplies
/// the transaction and has verified the product exists.
async fn delete_product_cascade<C: ConnectionTrait>(
    txn: &C,
    product_id: i32,
) -> Result<(), AppError> {
    let review_ids: Vec<i32> = review::Entity::find()
        .filter(review::Column::ProductId.eq(product_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    if !review_ids.is_empty() {
        like::Entity::delete_many()
            .filter(like::Column::ReviewId.is_in(review_ids.clone()))
            .exec(txn)
            .await?;
        review::Entity::delete_many()
            .filter(review::Column::Id.is_in(review_ids))
            .exec(txn)
            .await?;
    }

    favorite::Entity::delete_many()
        .filter(favorite::Column::ProductId.eq(product_id))
        .exec(txn)
        .await?;
    purchase::Entity::delete_many()
        .filter(purchase::Column::ProductId.eq(product_id))
        .exec(txn)
        .await?;
    product::Entity::delete_by_id(product_id).exec(txn).await?;

    Ok(())
}
