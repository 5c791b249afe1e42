//! Route definitions for `/chat-rooms` and `/messages`.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat-rooms`.
///
/// ```text
/// GET    /                  -> list_rooms
/// POST   /                  -> create_room
/// POST   /direct            -> direct_room
/// GET    /{id}/messages     -> list_messages
/// POST   /{id}/messages     -> send_message
/// POST   /{id}/mark-read    -> mark_room_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(chat::list_rooms).post(chat::create_room))
        .route("/direct", post(chat::direct_room))
        .route(
            "/{id}/messages",
            get(chat::list_messages).post(chat::send_message),
        )
        .route("/{id}/mark-read", post(chat::mark_room_read))
}

/// Routes mounted at `/messages`.
///
/// ```text
/// POST   /{id}/mark-read    -> mark_message_read
/// ```
pub fn messages_router() -> Router<AppState> {
    Router::new().route("/{id}/mark-read", post(chat::mark_message_read))
}
