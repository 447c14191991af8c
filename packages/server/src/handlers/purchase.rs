use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{product, purchase, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::product::find_product;
use crate::models::purchase::{PurchaseItem, PurchaseReceipt};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/purchase",
    tag = "Purchases",
    operation_id = "purchaseProduct",
    summary = "Buy one unit of a product",
    description = "Transfers the price from the buyer's budget to the publisher's. Buying a \
        product again increments the owned quantity. Publishers cannot buy their own products.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Purchase receipt", body = PurchaseReceipt),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 402, description = "Budget too low (INSUFFICIENT_FUNDS)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Buying own product (SELF_PURCHASE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, buyer_id = auth_user.user_id))]
pub async fn purchase_product(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PurchaseReceipt>, AppError> {
    let txn = state.db.begin().await?;

    let product = find_product(&txn, id).await?;
    if product.user_id == auth_user.user_id {
        return Err(AppError::SelfPurchase);
    }

    // Lock both balances FOR UPDATE in ascending user-id order so concurrent
    // purchases between the same pair cannot deadlock.
    let (first_id, second_id) = if auth_user.user_id < product.user_id {
        (auth_user.user_id, product.user_id)
    } else {
        (product.user_id, auth_user.user_id)
    };
    let first = lock_user(&txn, first_id).await?;
    let second = lock_user(&txn, second_id).await?;
    let (buyer, seller) = if first.id == auth_user.user_id {
        (first, second)
    } else {
        (second, first)
    };

    if buyer.budget < product.price {
        return Err(AppError::InsufficientFunds {
            budget: buyer.budget,
            price: product.price,
        });
    }

    let remaining_budget = buyer.budget - product.price;

    let mut buyer_active: user::ActiveModel = buyer.into();
    buyer_active.budget = Set(remaining_budget);
    buyer_active.update(&txn).await?;

    let seller_budget = seller.budget + product.price;
    let mut seller_active: user::ActiveModel = seller.into();
    seller_active.budget = Set(seller_budget);
    seller_active.update(&txn).await?;

    // The buyer row lock serializes the buyer's purchases, so a plain
    // find-then-write upsert on the composite key is race-free here.
    let now = chrono::Utc::now();
    let quantity = match purchase::Entity::find_by_id((auth_user.user_id, id))
        .one(&txn)
        .await?
    {
        Some(existing) => {
            let quantity = existing.quantity + 1;
            let mut active: purchase::ActiveModel = existing.into();
            active.quantity = Set(quantity);
            active.updated_at = Set(now);
            active.update(&txn).await?;
            quantity
        }
        None => {
            purchase::ActiveModel {
                user_id: Set(auth_user.user_id),
                product_id: Set(id),
                quantity: Set(1),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            1
        }
    };

    txn.commit().await?;

    tracing::info!(
        product_id = id,
        price = product.price,
        quantity,
        "purchase completed"
    );

    Ok(Json(PurchaseReceipt {
        product_id: id,
        quantity,
        price: product.price,
        remaining_budget,
        download_path: format!("/api/v1/products/{id}/pdf"),
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Purchases",
    operation_id = "listPurchases",
    summary = "List the caller's purchases",
    description = "Most recently bought first.",
    responses(
        (status = 200, description = "Purchase history", body = [PurchaseItem]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_purchases(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let rows = purchase::Entity::find()
        .filter(purchase::Column::UserId.eq(auth_user.user_id))
        .find_also_related(product::Entity)
        .order_by_desc(purchase::Column::UpdatedAt)
        .all(&state.db)
        .await?;

    let items: Vec<PurchaseItem> = rows
        .into_iter()
        .filter_map(|(p, product)| product.map(|pr| PurchaseItem::from_row(p, pr.name, pr.price)))
        .collect();

    Ok((StatusCode::OK, Json(items)))
}

async fn lock_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
