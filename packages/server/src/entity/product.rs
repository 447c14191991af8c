use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Price in budget units.
    pub price: i64,

    /// Cover image blob: content hash, original filename, byte size.
    pub image_hash: String,
    pub image_name: String,
    pub image_size: i64,
    /// The digital good itself.
    pub pdf_hash: String,
    pub pdf_name: String,
    pub pdf_size: i64,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub publisher: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::review::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
