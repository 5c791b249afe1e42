//! Chat room, message and read-status models.

use academy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::user::UserSummary;

/// A row from the `chat_rooms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatRoom {
    pub id: DbId,
    pub title: Option<String>,
    pub is_group: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A room as seen by one participant: last message preview and unread count.
#[derive(Debug, Clone, FromRow)]
pub struct ChatRoomOverview {
    #[sqlx(flatten)]
    pub room: ChatRoom,
    pub unread_count: i64,
    pub last_message_id: Option<DbId>,
    pub last_message_sender_id: Option<DbId>,
    pub last_message_content: Option<String>,
    pub last_message_at: Option<Timestamp>,
}

/// A participant of some room, used to batch-load participants.
#[derive(Debug, Clone, FromRow)]
pub struct RoomParticipant {
    pub chat_room_id: DbId,
    #[sqlx(flatten)]
    pub user: UserSummary,
}

/// DTO for creating a room.
#[derive(Debug, Deserialize)]
pub struct CreateChatRoom {
    pub title: Option<String>,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub participant_ids: Vec<DbId>,
}

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub chat_room_id: DbId,
    pub sender_id: DbId,
    pub content: String,
    pub image_url: Option<String>,
    pub file_url: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A message joined with its sender's public card.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageWithSender {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub message: Message,
    pub sender_username: String,
    pub sender_first_name: String,
    pub sender_last_name: String,
    pub sender_avatar_url: Option<String>,
}

/// DTO for sending a message. The room and sender come from the request.
#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    #[serde(default)]
    pub content: String,
    pub image_url: Option<String>,
    pub file_url: Option<String>,
}

impl CreateMessage {
    /// A message must carry text or an attachment.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.image_url.is_none() && self.file_url.is_none()
    }
}
