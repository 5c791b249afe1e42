//! Handlers for `/chat-rooms` and `/messages`.

use std::collections::HashMap;

use academy_core::types::{DbId, Timestamp};
use academy_db::models::chat::{
    ChatRoom, ChatRoomOverview, CreateChatRoom, CreateMessage, MessageWithSender,
};
use academy_db::models::user::UserSummary;
use academy_db::repositories::{ChatRepo, MessageRepo, UserRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{CountResponse, DataResponse, MessageResponse};
use crate::state::AppState;

const NOT_PARTICIPANT: &str = "You are not a participant in this chat room.";

/// Preview of the newest message in a room.
#[derive(Debug, Serialize)]
pub struct LastMessage {
    pub id: DbId,
    pub sender_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}

/// A room as listed for the caller.
#[derive(Debug, Serialize)]
pub struct ChatRoomView {
    #[serde(flatten)]
    pub room: ChatRoom,
    pub participants: Vec<UserSummary>,
    pub last_message: Option<LastMessage>,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct DirectRoomRequest {
    pub user_id: Option<DbId>,
}

/// GET /api/v1/chat-rooms
///
/// Newest activity first. Participants are loaded in one batch.
pub async fn list_rooms(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ChatRoomView>>>> {
    let overviews = ChatRepo::list_overviews_for_user(&state.pool, auth.user_id).await?;
    let room_ids: Vec<DbId> = overviews.iter().map(|o| o.room.id).collect();

    let mut participants: HashMap<DbId, Vec<UserSummary>> = HashMap::new();
    for p in ChatRepo::participants_for_rooms(&state.pool, &room_ids).await? {
        participants.entry(p.chat_room_id).or_default().push(p.user);
    }

    let rooms = overviews
        .into_iter()
        .map(|o| {
            let members = participants.remove(&o.room.id).unwrap_or_default();
            room_view(o, members)
        })
        .collect();

    Ok(Json(DataResponse { data: rooms }))
}

fn room_view(overview: ChatRoomOverview, participants: Vec<UserSummary>) -> ChatRoomView {
    let last_message = match (
        overview.last_message_id,
        overview.last_message_sender_id,
        overview.last_message_at,
    ) {
        (Some(id), Some(sender_id), Some(created_at)) => Some(LastMessage {
            id,
            sender_id,
            content: overview.last_message_content.unwrap_or_default(),
            created_at,
        }),
        _ => None,
    };

    ChatRoomView {
        room: overview.room,
        participants,
        last_message,
        unread_count: overview.unread_count,
    }
}

/// POST /api/v1/chat-rooms
pub async fn create_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateChatRoom>,
) -> AppResult<(StatusCode, Json<DataResponse<ChatRoom>>)> {
    let mut members = input.participant_ids.clone();
    members.push(auth.user_id);
    members.sort_unstable();
    members.dedup();

    let title = input.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let room = ChatRepo::create_room(&state.pool, title, input.is_group, &members).await?;

    tracing::info!(room_id = room.id, creator_id = auth.user_id, "Chat room created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: room })))
}

/// POST /api/v1/chat-rooms/direct
///
/// Returns the existing one-to-one room with `user_id`, creating it if needed.
pub async fn direct_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<DirectRoomRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ChatRoom>>)> {
    let other_id = input
        .user_id
        .ok_or_else(|| AppError::BadRequest("user_id is required.".into()))?;
    UserRepo::find_by_id(&state.pool, other_id)
        .await?
        .ok_or(AppError::not_found("User", other_id))?;

    if let Some(room) = ChatRepo::find_direct_room(&state.pool, auth.user_id, other_id).await? {
        return Ok((StatusCode::OK, Json(DataResponse { data: room })));
    }

    let room =
        ChatRepo::create_room(&state.pool, None, false, &[auth.user_id, other_id]).await?;
    tracing::info!(room_id = room.id, "Direct chat room created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: room })))
}

/// GET /api/v1/chat-rooms/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<MessageWithSender>>>> {
    require_participant(&state, room_id, auth.user_id).await?;
    let messages = MessageRepo::list_for_room(&state.pool, room_id).await?;
    Ok(Json(DataResponse { data: messages }))
}

/// POST /api/v1/chat-rooms/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<DbId>,
    Json(input): Json<CreateMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<MessageWithSender>>)> {
    require_participant(&state, room_id, auth.user_id).await?;
    if input.is_empty() {
        return Err(AppError::BadRequest(
            "A message needs content or an attachment.".into(),
        ));
    }

    let message = MessageRepo::create(&state.pool, room_id, auth.user_id, &input).await?;
    ChatRepo::touch(&state.pool, room_id).await?;

    let message = MessageRepo::find_with_sender(&state.pool, message.id)
        .await?
        .ok_or(AppError::not_found("Message", message.id))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

/// POST /api/v1/chat-rooms/{id}/mark-read
pub async fn mark_room_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    require_participant(&state, room_id, auth.user_id).await?;
    let count = MessageRepo::mark_room_read(&state.pool, room_id, auth.user_id).await?;
    let count = u64::try_from(count).unwrap_or_default();

    Ok(Json(DataResponse {
        data: CountResponse {
            message: format!("{count} messages marked as read."),
            count,
        },
    }))
}

/// POST /api/v1/messages/{id}/mark-read
pub async fn mark_message_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let message = MessageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Message", id))?;
    require_participant(&state, message.chat_room_id, auth.user_id).await?;

    if message.sender_id == auth.user_id {
        return Err(AppError::BadRequest(
            "You cannot mark your own message as read.".into(),
        ));
    }

    MessageRepo::mark_read(&state.pool, message.id, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: MessageResponse::new("Message marked as read."),
    }))
}

/// 404 when the room is missing, 403 when the caller is not in it.
async fn require_participant(state: &AppState, room_id: DbId, user_id: DbId) -> AppResult<()> {
    ChatRepo::find_by_id(&state.pool, room_id)
        .await?
        .ok_or(AppError::not_found("ChatRoom", room_id))?;
    if !ChatRepo::is_participant(&state.pool, room_id, user_id).await? {
        return Err(AppError::forbidden(NOT_PARTICIPANT));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn overview(last_id: Option<DbId>) -> ChatRoomOverview {
        let now = Utc::now();
        ChatRoomOverview {
            room: ChatRoom {
                id: 7,
                title: None,
                is_group: false,
                created_at: now,
                updated_at: now,
            },
            unread_count: 2,
            last_message_id: last_id,
            last_message_sender_id: last_id.map(|_| 3),
            last_message_content: last_id.map(|_| "hi".to_string()),
            last_message_at: last_id.map(|_| now),
        }
    }

    #[test]
    fn room_without_messages_has_no_preview() {
        let view = room_view(overview(None), Vec::new());
        assert!(view.last_message.is_none());
        assert_eq!(view.unread_count, 2);
    }

    #[test]
    fn room_preview_carries_last_message() {
        let view = room_view(overview(Some(11)), Vec::new());
        let last = view.last_message.expect("preview");
        assert_eq!(last.id, 11);
        assert_eq!(last.sender_id, 3);
        assert_eq!(last.content, "hi");
    }
}
