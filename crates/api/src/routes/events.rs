//! Route definitions for `/events` and `/event-registrations`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// POST   /                            -> create_event (admin)
/// GET    /{id}                        -> get_event
/// PUT    /{id}                        -> update_event (admin)
/// DELETE /{id}                        -> delete_event (admin)
/// POST   /{id}/speakers               -> add_speaker (admin)
/// POST   /{id}/register               -> register
/// POST   /{id}/payment-intent         -> create_payment_intent
/// POST   /{id}/confirm-payment        -> confirm_payment
/// POST   /{id}/cancel-registration    -> cancel_registration
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(events::create_event))
        .route(
            "/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/{id}/speakers", post(events::add_speaker))
        .route("/{id}/register", post(events::register))
        .route("/{id}/payment-intent", post(events::create_payment_intent))
        .route("/{id}/confirm-payment", post(events::confirm_payment))
        .route("/{id}/cancel-registration", post(events::cancel_registration))
}

/// Routes mounted at `/event-registrations`.
///
/// ```text
/// GET    /{id}                        -> get_registration
/// ```
pub fn registrations_router() -> Router<AppState> {
    Router::new().route("/{id}", get(events::get_registration))
}
