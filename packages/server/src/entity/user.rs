use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 password hash, never the plaintext.
    pub password: String,

    /// Internal credit balance, the sole currency for purchases.
    pub budget: i64,

    /// Content hash of the profile picture blob, if one was uploaded.
    pub profile_picture_hash: Option<String>,
    pub profile_picture_name: Option<String>,

    pub is_admin: bool,

    #[sea_orm(has_many)]
    pub products: HasMany<super::product::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
