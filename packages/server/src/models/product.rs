use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::entity::product;
use crate::error::AppError;
use crate::models::review::ReviewResponse;
use crate::models::shared::Pagination;

/// Maximum product name length.
pub const MAX_NAME_LEN: usize = 128;

/// A catalog product.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    #[schema(example = 17)]
    pub id: i32,
    #[schema(example = "Sourdough Field Guide")]
    pub name: String,
    /// Price in budget units.
    #[schema(example = 40)]
    pub price: i64,
    /// Publisher's user ID.
    pub user_id: i32,
    pub image_name: String,
    pub pdf_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            price: m.price,
            user_id: m.user_id,
            image_name: m.image_name,
            pdf_name: m.pdf_name,
            created_at: m.created_at,
        }
    }
}

/// Product detail including its reviews.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    /// Publisher's username.
    pub publisher: String,
    pub reviews: Vec<ReviewResponse>,
}

/// Query parameters for the product list.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProductListQuery {
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct ProductListItem {
    pub id: i32,
    pub name: String,
    pub price: i64,
    pub user_id: i32,
    pub image_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductListResponse {
    pub data: Vec<ProductListItem>,
    pub pagination: Pagination,
}

/// Validated metadata fields of a product-creation multipart form.
pub struct NewProductFields {
    pub name: String,
    pub price: i64,
}

pub fn validate_product_fields(name: &str, price: i64) -> Result<NewProductFields, AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Product name must be 1-{MAX_NAME_LEN} characters"
        )));
    }
    if price < 0 {
        return Err(AppError::Validation("Price must not be negative".into()));
    }
    Ok(NewProductFields {
        name: name.to_string(),
        price,
    })
}

/// Request body for admin product updates (PATCH semantics).
#[derive(Default, PartialEq, Deserialize, utoipa::ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
}

pub fn validate_update_product(payload: &UpdateProductRequest) -> Result<(), AppError> {
    if let Some(ref name) = payload.name {
        validate_product_fields(name, 0)?;
    }
    if payload.price.is_some_and(|p| p < 0) {
        return Err(AppError::Validation("Price must not be negative".into()));
    }
    Ok(())
}
