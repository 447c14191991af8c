use axum::Json;
use axum::extract::{Path, State};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{favorite, product};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::product::find_product;
use crate::models::favorite::{FavoriteItem, FavoriteResponse};
use crate::state::AppState;

#[utoipa::path(
    put,
    path = "/{id}/favorite",
    tag = "Favorites",
    operation_id = "addFavorite",
    summary = "Add a product to the caller's favorites",
    description = "Idempotent: favoriting twice is a no-op.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Favorite state", body = FavoriteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn add_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FavoriteResponse>, AppError> {
    find_product(&state.db, id).await?;

    let insert = favorite::Entity::insert(favorite::ActiveModel {
        user_id: Set(auth_user.user_id),
        product_id: Set(id),
        created_at: Set(chrono::Utc::now()),
    })
    .on_conflict(
        OnConflict::columns([favorite::Column::UserId, favorite::Column::ProductId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&state.db)
    .await;

    match insert {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(Json(FavoriteResponse { favorited: true })),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    delete,
    path = "/{id}/favorite",
    tag = "Favorites",
    operation_id = "removeFavorite",
    summary = "Remove a product from the caller's favorites",
    description = "Idempotent: removing an absent favorite is a no-op.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Favorite state", body = FavoriteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn remove_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FavoriteResponse>, AppError> {
    favorite::Entity::delete_by_id((auth_user.user_id, id))
        .exec(&state.db)
        .await?;

    Ok(Json(FavoriteResponse { favorited: false }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Favorites",
    operation_id = "listFavorites",
    summary = "List the caller's favorite products",
    description = "Most recently favorited first.",
    responses(
        (status = 200, description = "Favorites", body = [FavoriteItem]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_favorites(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<FavoriteItem>>, AppError> {
    let rows = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(auth_user.user_id))
        .find_also_related(product::Entity)
        .order_by_desc(favorite::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .filter_map(|(f, product)| {
            product.map(|p| FavoriteItem {
                product_id: f.product_id,
                name: p.name,
                price: p.price,
                favorited_at: f.created_at,
            })
        })
        .collect();

    Ok(Json(items))
}
