//! Route definitions for the `/payments` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// POST   /webhook           -> webhook (signature checked, no JWT)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(payments::webhook))
}
