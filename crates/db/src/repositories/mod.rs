//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or a `PgConnection` inside a transaction) as the
//! first argument.

pub mod chat_repo;
pub mod course_repo;
pub mod enrollment_repo;
pub mod event_repo;
pub mod lesson_repo;
pub mod message_repo;
pub mod notification_repo;
pub mod password_reset_repo;
pub mod post_repo;
pub mod registration_repo;
pub mod session_repo;
pub mod speaker_repo;
pub mod user_repo;

pub use chat_repo::ChatRepo;
pub use course_repo::CourseRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use event_repo::EventRepo;
pub use lesson_repo::LessonRepo;
pub use message_repo::MessageRepo;
pub use notification_repo::NotificationRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use post_repo::{CommentRepo, LikeRepo, PostRepo};
pub use registration_repo::RegistrationRepo;
pub use session_repo::SessionRepo;
pub use speaker_repo::SpeakerRepo;
pub use user_repo::UserRepo;
