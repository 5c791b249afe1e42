//! Handlers for `/events` and `/event-registrations`.

use academy_core::types::DbId;
use academy_db::models::event::{
    CreateEvent, CreateSpeaker, Event, EventSpeaker, RegistrationDetail, UpdateEvent,
};
use academy_db::repositories::{EventRepo, RegistrationRepo, SpeakerRepo, UserRepo};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::payments::{self, PaymentIntentResponse};
use crate::handlers::{optional_json, require_text};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::rbac::RequireAdmin;
use crate::purchase::{self, PurchasableItem, PurchaseRecord};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Published event with speakers and the caller's registration state.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub speakers: Vec<EventSpeaker>,
    pub registered_count: i64,
    pub is_full: bool,
    pub is_past: bool,
    pub is_registered: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub simulate_payment: bool,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Event CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<Event>>)> {
    require_text("title", &input.title)?;
    if input.end_date < input.start_date {
        return Err(AppError::field(
            "end_date",
            "End date must not be before the start date.",
        ));
    }

    let event = EventRepo::create(&state.pool, admin.user_id, &input).await?;
    tracing::info!(event_id = event.id, organizer_id = admin.user_id, "Event created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EventDetail>>> {
    let is_admin = viewer.0.as_ref().is_some_and(AuthUser::is_admin);
    let event = if is_admin {
        EventRepo::find_by_id(&state.pool, id).await?
    } else {
        EventRepo::find_published(&state.pool, id).await?
    }
    .ok_or(AppError::not_found("Event", id))?;

    let speakers = SpeakerRepo::list_for_event(&state.pool, id).await?;
    let registered_count = RegistrationRepo::count_active(&state.pool, id).await?;
    let is_registered = match viewer.user_id() {
        Some(user_id) => RegistrationRepo::find_active(&state.pool, user_id, id)
            .await?
            .is_some(),
        None => false,
    };

    Ok(Json(DataResponse {
        data: EventDetail {
            is_full: event.is_full(registered_count),
            is_past: event.is_past(Utc::now()),
            event,
            speakers,
            registered_count,
            is_registered,
        },
    }))
}

/// PUT /api/v1/events/{id}
///
/// A 23514 from the date CHECK surfaces as a 500, so dates are checked here.
pub async fn update_event(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<DataResponse<Event>>> {
    if let Some(title) = &input.title {
        require_text("title", title)?;
    }
    let current = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Event", id))?;
    let start = input.start_date.unwrap_or(current.start_date);
    let end = input.end_date.unwrap_or(current.end_date);
    if end < start {
        return Err(AppError::field(
            "end_date",
            "End date must not be before the start date.",
        ));
    }

    let event = EventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Event", id))?;
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !EventRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Event", id));
    }
    tracing::info!(event_id = id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{id}/speakers
pub async fn add_speaker(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(event_id): Path<DbId>,
    Json(input): Json<CreateSpeaker>,
) -> AppResult<(StatusCode, Json<DataResponse<EventSpeaker>>)> {
    require_text("name", &input.name)?;
    EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::not_found("Event", event_id))?;

    let speaker = SpeakerRepo::create(&state.pool, event_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: speaker })))
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// POST /api/v1/events/{id}/register
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<PurchaseRecord>>)> {
    let input: RegisterRequest = optional_json(&body)?;
    let event = published_event(&state, id).await?;
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::not_found("User", auth.user_id))?;

    let notes = input.notes.as_deref().filter(|n| !n.trim().is_empty());
    let record = purchase::register(&state, &user, event, notes, input.simulate_payment).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// POST /api/v1/events/{id}/payment-intent
pub async fn create_payment_intent(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PaymentIntentResponse>>> {
    let item = PurchasableItem::Event(published_event(&state, id).await?);
    payments::start_intent(&state, auth.user_id, &item).await
}

/// POST /api/v1/events/{id}/confirm-payment
pub async fn confirm_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<PurchaseRecord>>)> {
    let item = PurchasableItem::Event(published_event(&state, id).await?);
    payments::confirm_from_body(&state, auth.user_id, &item, &body).await
}

/// POST /api/v1/events/{id}/cancel-registration
pub async fn cancel_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Event", id))?;

    if !RegistrationRepo::cancel(&state.pool, auth.user_id, id).await? {
        return Err(AppError::BadRequest(
            "You are not registered for this event.".into(),
        ));
    }
    tracing::info!(user_id = auth.user_id, event_id = id, "Registration cancelled");

    Ok(Json(DataResponse {
        data: MessageResponse::new("Successfully cancelled your registration."),
    }))
}

/// GET /api/v1/event-registrations/{id}
///
/// Ticket view for the attendee, and for admins scanning the QR code.
pub async fn get_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RegistrationDetail>>> {
    let detail = RegistrationRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("EventRegistration", id))?;
    if !auth.can_access(detail.registration.attendee_id) {
        return Err(AppError::forbidden(
            "You do not have permission to view this registration.",
        ));
    }
    Ok(Json(DataResponse { data: detail }))
}

async fn published_event(state: &AppState, id: DbId) -> AppResult<Event> {
    EventRepo::find_published(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Event", id))
}
