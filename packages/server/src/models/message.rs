use serde::{Deserialize, Serialize};

use crate::entity::message;
use crate::error::AppError;

/// Maximum message length.
pub const MAX_CONTENT_LEN: usize = 2000;

/// Request body for sending a direct message.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SendMessageRequest {
    pub recipient_id: i32,
    #[schema(example = "Is the second edition coming?")]
    pub content: String,
}

pub fn validate_send_message(payload: &SendMessageRequest) -> Result<(), AppError> {
    if payload.content.trim().is_empty() {
        return Err(AppError::EmptyContent);
    }
    if payload.content.chars().count() > MAX_CONTENT_LEN {
        return Err(AppError::Validation(format!(
            "Message must be at most {MAX_CONTENT_LEN} characters"
        )));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub id: i32,
    pub sender_id: i32,
    pub recipient_id: i32,
    pub content: String,
    pub sent_at: chrono::DateTime<chrono::Utc>,
}

impl From<message::Model> for MessageResponse {
    fn from(m: message::Model) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            recipient_id: m.recipient_id,
            content: m.content,
            sent_at: m.sent_at,
        }
    }
}

/// The full exchange between the caller and one other user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ThreadResponse {
    /// The other participant's user ID.
    pub with_user_id: i32,
    pub with_username: String,
    /// Messages in both directions, oldest first.
    pub messages: Vec<MessageResponse>,
}

/// One entry in the caller's conversation list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ConversationPartner {
    pub user_id: i32,
    pub username: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ConversationListResponse {
    pub partners: Vec<ConversationPartner>,
}
