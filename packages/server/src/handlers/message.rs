use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{message, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::message::{
    ConversationListResponse, ConversationPartner, MessageResponse, SendMessageRequest,
    ThreadResponse, validate_send_message,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Messages",
    operation_id = "sendMessage",
    summary = "Send a direct message",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Empty content (EMPTY_CONTENT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipient not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(sender_id = auth_user.user_id))]
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_send_message(&payload)?;

    let recipient = user::Entity::find_by_id(payload.recipient_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipient not found".into()))?;

    let model = message::ActiveModel {
        sender_id: Set(auth_user.user_id),
        recipient_id: Set(recipient.id),
        content: Set(payload.content),
        sent_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{user_id}",
    tag = "Messages",
    operation_id = "getThread",
    summary = "Get the conversation with another user",
    description = "Returns messages in both directions, oldest first. Both participants see \
        the identical thread.",
    params(("user_id" = i32, Path, description = "The other participant's user ID")),
    responses(
        (status = 200, description = "Conversation thread", body = ThreadResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id, caller_id = auth_user.user_id))]
pub async fn get_thread(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<ThreadResponse>, AppError> {
    let other = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let me = auth_user.user_id;
    let messages = message::Entity::find()
        .filter(
            Condition::any()
                .add(
                    message::Column::SenderId
                        .eq(me)
                        .and(message::Column::RecipientId.eq(user_id)),
                )
                .add(
                    message::Column::SenderId
                        .eq(user_id)
                        .and(message::Column::RecipientId.eq(me)),
                ),
        )
        .order_by_asc(message::Column::SentAt)
        .order_by_asc(message::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ThreadResponse {
        with_user_id: other.id,
        with_username: other.username,
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Messages",
    operation_id = "listConversations",
    summary = "List the caller's conversation partners",
    responses(
        (status = 200, description = "Conversation partners", body = ConversationListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_conversations(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ConversationListResponse>, AppError> {
    let me = auth_user.user_id;
    let messages = message::Entity::find()
        .filter(
            Condition::any()
                .add(message::Column::SenderId.eq(me))
                .add(message::Column::RecipientId.eq(me)),
        )
        .order_by_desc(message::Column::SentAt)
        .all(&state.db)
        .await?;

    // Partners ordered by most recent exchange.
    let mut partner_ids: Vec<i32> = Vec::new();
    for m in &messages {
        let other = if m.sender_id == me { m.recipient_id } else { m.sender_id };
        if !partner_ids.contains(&other) {
            partner_ids.push(other);
        }
    }

    let usernames: std::collections::HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(partner_ids.clone()))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let partners = partner_ids
        .into_iter()
        .filter_map(|id| {
            usernames.get(&id).map(|username| ConversationPartner {
                user_id: id,
                username: username.clone(),
            })
        })
        .collect();

    Ok(Json(ConversationListResponse { partners }))
}
