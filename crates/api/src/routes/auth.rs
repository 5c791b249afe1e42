//! Route definitions for the `/auth` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /register                -> register
/// POST   /login                   -> login
/// POST   /refresh                 -> refresh
/// POST   /logout                  -> logout (requires auth)
/// GET    /profile                 -> get_profile
/// PUT    /profile                 -> update_profile
/// PATCH  /profile                 -> update_profile
/// POST   /change-password         -> change_password
/// POST   /password-reset          -> request_password_reset
/// POST   /password-reset-confirm  -> confirm_password_reset
/// DELETE /delete-account          -> delete_account
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(auth::get_profile)
                .put(auth::update_profile)
                .patch(auth::update_profile),
        )
        .route("/change-password", post(auth::change_password))
        .route("/password-reset", post(auth::request_password_reset))
        .route("/password-reset-confirm", post(auth::confirm_password_reset))
        .route("/delete-account", delete(auth::delete_account))
}
