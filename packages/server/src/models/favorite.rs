use serde::Serialize;

/// Response to a favorite add/remove request.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FavoriteResponse {
    /// Whether the product is on the caller's favorites list after this request.
    pub favorited: bool,
}

/// One entry on the caller's favorites list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FavoriteItem {
    pub product_id: i32,
    pub name: String,
    pub price: i64,
    pub favorited_at: chrono::DateTime<chrono::Utc>,
}
