pub mod auth;
pub mod chat;
pub mod courses;
pub mod events;
pub mod health;
pub mod notifications;
pub mod payments;
pub mod timeline;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                  register (public)
/// /auth/login                                     login (public)
/// /auth/refresh                                   refresh (public)
/// /auth/logout                                    logout
/// /auth/profile                                   get, update
/// /auth/change-password                           change password
/// /auth/password-reset                            request reset code (public)
/// /auth/password-reset-confirm                    confirm reset code (public)
/// /auth/delete-account                            delete own account
///
/// /courses                                        create (admin)
/// /courses/{id}                                   get, update, delete
/// /courses/{id}/lessons                           create lesson (admin)
/// /courses/{id}/payment-intent                    start card payment
/// /courses/{id}/confirm-payment                   confirm purchase
/// /courses/{id}/enroll                            enroll (free or simulated)
/// /courses/{id}/unenroll                          unenroll
/// /lessons/{id}/complete                          complete lesson
/// /enrollments/paid-orders                        paid orders (admin)
/// /enrollments/{id}/progress                      lesson progress
/// /enrollments/{id}/lessons/{lesson_id}/complete  complete lesson
/// /enrollments/{id}/certificate                   certificate
///
/// /events                                         create (admin)
/// /events/{id}                                    get, update, delete
/// /events/{id}/speakers                           add speaker (admin)
/// /events/{id}/register                           register (free or simulated)
/// /events/{id}/payment-intent                     start card payment
/// /events/{id}/confirm-payment                    confirm purchase
/// /events/{id}/cancel-registration                cancel
/// /event-registrations/{id}                       ticket detail
///
/// /chat-rooms                                     list, create
/// /chat-rooms/direct                              get or create direct room
/// /chat-rooms/{id}/messages                       list, send
/// /chat-rooms/{id}/mark-read                      mark room read
/// /messages/{id}/mark-read                        mark message read
///
/// /posts                                          create
/// /posts/{id}                                     get, update, delete
/// /posts/{id}/like                                like
/// /posts/{id}/unlike                              unlike
/// /posts/{id}/comments                            list, create
/// /comments/{id}                                  update, delete
///
/// /notifications/unread-count                     unread count
/// /notifications/read-all                         mark all read
/// /notifications/clear                            delete read
/// /notifications/{id}/read                        mark read
///
/// /payments/webhook                               processor webhook (signed)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts, sessions and password reset.
        .nest("/auth", auth::router())
        // Courses, lessons and enrollment progress.
        .nest("/courses", courses::router())
        .nest("/lessons", courses::lessons_router())
        .nest("/enrollments", courses::enrollments_router())
        // Events and their tickets.
        .nest("/events", events::router())
        .nest("/event-registrations", events::registrations_router())
        // Chat rooms and messages.
        .nest("/chat-rooms", chat::router())
        .nest("/messages", chat::messages_router())
        // Social timeline.
        .nest("/posts", timeline::router())
        .nest("/comments", timeline::comments_router())
        // In-app notifications.
        .nest("/notifications", notifications::router())
        // Processor webhooks.
        .nest("/payments", payments::router())
}
