use axum::Json;
use axum::extract::State;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::purchase::{DepositRequest, DepositResponse, validate_deposit};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/deposit",
    tag = "Wallet",
    operation_id = "deposit",
    summary = "Add funds to the caller's budget",
    request_body = DepositRequest,
    responses(
        (status = 200, description = "New balance", body = DepositResponse),
        (status = 400, description = "Non-positive or malformed amount (INVALID_AMOUNT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn deposit(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<DepositRequest>,
) -> Result<Json<DepositResponse>, AppError> {
    validate_deposit(&payload)?;

    // Single atomic increment; no read-modify-write race with purchases.
    let result = user::Entity::update_many()
        .col_expr(
            user::Column::Budget,
            Expr::col(user::Column::Budget).add(payload.amount),
        )
        .filter(user::Column::Id.eq(auth_user.user_id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    tracing::info!(amount = payload.amount, budget = user.budget, "deposit credited");

    Ok(Json(DepositResponse {
        budget: user.budget,
    }))
}
