use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A directed message. Rows are append-only and never edited.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub sender_id: i32,
    #[sea_orm(belongs_to, from = "sender_id", to = "id")]
    pub sender: HasOne<super::user::Entity>,

    /// Not a relation field: a second user relation would be ambiguous.
    pub recipient_id: i32,

    pub content: String,

    /// Server-assigned timestamp; thread ordering key.
    pub sent_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
