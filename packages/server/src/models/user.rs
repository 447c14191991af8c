use serde::Serialize;

use crate::entity::user;

/// A user as shown in the admin moderation list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub budget: i64,
    pub is_admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<user::Model> for UserSummary {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            budget: u.budget,
            is_admin: u.is_admin,
            created_at: u.created_at,
        }
    }
}
