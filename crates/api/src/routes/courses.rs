//! Route definitions for `/courses`, `/lessons` and `/enrollments`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{courses, enrollments};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// POST   /                        -> create_course (admin)
/// GET    /{id}                    -> get_course
/// PUT    /{id}                    -> update_course (admin)
/// DELETE /{id}                    -> delete_course (admin)
/// POST   /{id}/lessons            -> create_lesson (admin)
/// POST   /{id}/payment-intent     -> create_payment_intent
/// POST   /{id}/confirm-payment    -> confirm_payment
/// POST   /{id}/enroll             -> enroll
/// POST   /{id}/unenroll           -> unenroll
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(courses::create_course))
        .route(
            "/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .route("/{id}/lessons", post(courses::create_lesson))
        .route("/{id}/payment-intent", post(courses::create_payment_intent))
        .route("/{id}/confirm-payment", post(courses::confirm_payment))
        .route("/{id}/enroll", post(courses::enroll))
        .route("/{id}/unenroll", post(courses::unenroll))
}

/// Routes mounted at `/lessons`.
///
/// ```text
/// POST   /{id}/complete           -> complete_lesson
/// ```
pub fn lessons_router() -> Router<AppState> {
    Router::new().route("/{id}/complete", post(courses::complete_lesson))
}

/// Routes mounted at `/enrollments`.
///
/// ```text
/// GET    /paid-orders                          -> paid_orders (admin)
/// GET    /{id}/progress                        -> progress
/// POST   /{id}/lessons/{lesson_id}/complete    -> complete_lesson
/// GET    /{id}/certificate                     -> certificate
/// ```
pub fn enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/paid-orders", get(enrollments::paid_orders))
        .route("/{id}/progress", get(enrollments::progress))
        .route(
            "/{id}/lessons/{lesson_id}/complete",
            post(enrollments::complete_lesson),
        )
        .route("/{id}/certificate", get(enrollments::certificate))
}
