//! Route definitions for `/posts` and `/comments`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::timeline;
use crate::state::AppState;

/// Routes mounted at `/posts`.
///
/// ```text
/// POST   /                  -> create_post
/// GET    /{id}              -> get_post
/// PUT    /{id}              -> update_post (author)
/// DELETE /{id}              -> delete_post (author)
/// POST   /{id}/like         -> like_post
/// POST   /{id}/unlike       -> unlike_post
/// GET    /{id}/comments     -> list_comments
/// POST   /{id}/comments     -> create_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(timeline::create_post))
        .route(
            "/{id}",
            get(timeline::get_post)
                .put(timeline::update_post)
                .delete(timeline::delete_post),
        )
        .route("/{id}/like", post(timeline::like_post))
        .route("/{id}/unlike", post(timeline::unlike_post))
        .route(
            "/{id}/comments",
            get(timeline::list_comments).post(timeline::create_comment),
        )
}

/// Routes mounted at `/comments`.
///
/// ```text
/// PUT    /{id}              -> update_comment (author)
/// DELETE /{id}              -> delete_comment (author or admin)
/// ```
pub fn comments_router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        put(timeline::update_comment).delete(timeline::delete_comment),
    )
}
