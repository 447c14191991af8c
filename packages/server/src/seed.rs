use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::AppConfig;
use crate::entity::{message, user};
use crate::utils::hash;

/// Seed the bootstrap admin account from config, if one is configured.
///
/// Idempotent: an existing user with the configured username is left
/// untouched, password and admin flag included.
pub async fn seed_admin_user(db: &DatabaseConnection, config: &AppConfig) -> anyhow::Result<()> {
    let Some(ref admin) = config.auth.admin else {
        return Ok(());
    };

    let password_hash = hash::hash_password(&admin.password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

    let model = user::ActiveModel {
        username: Set(admin.username.clone()),
        password: Set(password_hash),
        budget: Set(0),
        is_admin: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!(username = %admin.username, "Seeded admin user"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for conversation threads:
    // SELECT * FROM message WHERE sender_id = ? AND recipient_id = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_message_sender_recipient")
        .table(message::Entity)
        .col(message::Column::SenderId)
        .col(message::Column::RecipientId)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_message_sender_recipient exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_message_sender_recipient: {}", e);
        }
    }

    Ok(())
}
