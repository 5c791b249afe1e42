//! Request handlers, one module per resource.
//!
//! Handlers check permissions, delegate to the repositories in
//! `academy_db` (or to [`crate::purchase`]) and map errors via
//! [`AppError`].

pub mod auth;
pub mod chat;
pub mod courses;
pub mod enrollments;
pub mod events;
pub mod notifications;
pub mod payments;
pub mod timeline;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// Parse an optional JSON body. An empty body yields `T::default()`.
pub(crate) fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

/// Reject blank text input with a field error.
pub(crate) fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::field(field, "This field may not be blank."));
    }
    Ok(())
}
