//! Handlers for `/notifications`.

use academy_core::types::DbId;
use academy_db::models::notification::Notification;
use academy_db::repositories::NotificationRepo;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{CountResponse, DataResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread_count: i64,
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let unread_count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { unread_count },
    }))
}

/// POST /api/v1/notifications/{id}/read
///
/// Notifications owned by other users are reported as missing.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Notification>>> {
    let notification = NotificationRepo::mark_read(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("Notification", id))?;
    Ok(Json(DataResponse { data: notification }))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: CountResponse {
            message: format!("{count} notifications marked as read"),
            count,
        },
    }))
}

/// DELETE /api/v1/notifications/clear
pub async fn clear_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = NotificationRepo::clear_read(&state.pool, auth.user_id).await?;
    tracing::debug!(user_id = auth.user_id, count, "Cleared read notifications");
    Ok(Json(DataResponse {
        data: CountResponse {
            message: format!("{count} notifications deleted"),
            count,
        },
    }))
}
