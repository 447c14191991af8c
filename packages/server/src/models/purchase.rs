use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::entity::purchase;
use crate::error::AppError;

/// Receipt returned by a successful purchase.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PurchaseReceipt {
    pub product_id: i32,
    /// Cumulative quantity the buyer now owns of this product.
    #[schema(example = 2)]
    pub quantity: i32,
    /// Price paid for this unit.
    #[schema(example = 40)]
    pub price: i64,
    /// Buyer's budget after the transfer.
    #[schema(example = 20)]
    pub remaining_budget: i64,
    /// Where to download the purchased file.
    #[schema(example = "/api/v1/products/17/pdf")]
    pub download_path: String,
}

/// One row of the caller's purchase history.
#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct PurchaseItem {
    pub product_id: i32,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PurchaseItem {
    pub fn from_row(p: purchase::Model, name: String, price: i64) -> Self {
        Self {
            product_id: p.product_id,
            name,
            price,
            quantity: p.quantity,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Request body for wallet deposits.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct DepositRequest {
    /// Amount to credit; must be a positive integer.
    #[schema(example = 50)]
    pub amount: i64,
}

pub fn validate_deposit(payload: &DepositRequest) -> Result<(), AppError> {
    if payload.amount <= 0 {
        return Err(AppError::InvalidAmount(format!(
            "Deposit amount must be a positive integer, got {}",
            payload.amount
        )));
    }
    Ok(())
}

/// Response to a successful deposit.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DepositResponse {
    /// Budget after the deposit.
    #[schema(example = 150)]
    pub budget: i64,
}
