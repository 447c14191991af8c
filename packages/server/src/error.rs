use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`, `NOT_FOUND`,
    /// `USERNAME_TAKEN`, `SELF_PURCHASE`, `INSUFFICIENT_FUNDS`, `INVALID_AMOUNT`,
    /// `EMPTY_CONTENT`, `CONFLICT`, `INTERNAL_ERROR`.
    #[schema(example = "INSUFFICIENT_FUNDS")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Budget 20 is less than the product price 40")]
    pub message: String,
}

/// Application-level error type.
///
/// Every variant maps to a user-visible denial; none are fatal to the
/// server process.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    UsernameTaken,
    /// Attempt to buy one's own product.
    SelfPurchase,
    /// Buyer's budget is below the product price. Carries both values.
    InsufficientFunds {
        budget: i64,
        price: i64,
    },
    /// Deposit amount is not a positive integer.
    InvalidAmount(String),
    /// Message content is empty or whitespace-only.
    EmptyContent,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid username or password".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "USERNAME_TAKEN",
                    message: "Username is already taken".into(),
                },
            ),
            AppError::SelfPurchase => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "SELF_PURCHASE",
                    message: "You cannot buy your own product".into(),
                },
            ),
            AppError::InsufficientFunds { budget, price } => (
                StatusCode::PAYMENT_REQUIRED,
                ErrorBody {
                    code: "INSUFFICIENT_FUNDS",
                    message: format!("Budget {budget} is less than the product price {price}"),
                },
            ),
            AppError::InvalidAmount(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_AMOUNT",
                    message: msg,
                },
            ),
            AppError::EmptyContent => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "EMPTY_CONTENT",
                    message: "Message content cannot be empty".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(hash) => {
                tracing::warn!("Blob missing from store: {hash}");
                AppError::NotFound("File not found".into())
            }
            StorageError::SizeLimitExceeded { actual, limit } => AppError::Validation(format!(
                "File exceeds maximum size ({actual} > {limit} bytes)"
            )),
            other => AppError::Internal(other.to_string()),
        }
    }
}
