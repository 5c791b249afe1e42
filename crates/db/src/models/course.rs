//! Course, lesson, enrollment and lesson-progress models.

use academy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub price_cents: i64,
    pub currency: String,
    pub image_url: Option<String>,
    pub teacher_id: DbId,
    pub category: String,
    pub level: String,
    pub is_online: bool,
    pub is_in_person: bool,
    pub is_published: bool,
    pub duration_weeks: i32,
    pub max_students: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    pub fn is_free(&self) -> bool {
        self.price_cents <= 0
    }

    /// A `max_students` of 0 means unlimited.
    pub fn is_full(&self, enrolled_count: i64) -> bool {
        self.max_students > 0 && enrolled_count >= i64::from(self.max_students)
    }
}

/// DTO for creating a course. Omitted fields take the column defaults.
#[derive(Debug, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub is_online: Option<bool>,
    pub is_in_person: Option<bool>,
    pub is_published: Option<bool>,
    pub duration_weeks: Option<i32>,
    pub max_students: Option<i32>,
}

/// DTO for updating a course. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub is_online: Option<bool>,
    pub is_in_person: Option<bool>,
    pub is_published: Option<bool>,
    pub duration_weeks: Option<i32>,
    pub max_students: Option<i32>,
}

/// A row from the `lessons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub description: String,
    pub content_type: String,
    pub sort_order: i32,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub duration_mins: i32,
    pub is_free_preview: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a lesson. The course comes from the URL.
#[derive(Debug, Deserialize)]
pub struct CreateLesson {
    pub title: String,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub sort_order: Option<i32>,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub duration_mins: Option<i32>,
    pub is_free_preview: Option<bool>,
}

/// A row from the `enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub is_active: bool,
    pub progress_percentage: i32,
    pub enrolled_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub paid: bool,
    pub amount_paid_cents: Option<i64>,
    pub currency: String,
    pub payment_reference: Option<String>,
    pub qr_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of an insert-or-reactivate upsert.
///
/// `inserted` is true only when this statement created the row.
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentActivation {
    #[sqlx(flatten)]
    pub enrollment: Enrollment,
    pub inserted: bool,
}

/// A row from the `lesson_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonProgress {
    pub id: DbId,
    pub enrollment_id: DbId,
    pub lesson_id: DbId,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Lesson progress joined with its lesson, ordered for display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonProgressDetail {
    pub id: DbId,
    pub enrollment_id: DbId,
    pub lesson_id: DbId,
    pub lesson_title: String,
    pub lesson_order: i32,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
}

/// A paid active enrollment joined with its student and course.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaidOrder {
    pub enrollment_id: DbId,
    pub course_id: DbId,
    pub course_title: String,
    pub student_id: DbId,
    pub student_email: String,
    pub student_first_name: String,
    pub student_last_name: String,
    pub amount_paid_cents: Option<i64>,
    pub currency: String,
    pub payment_reference: Option<String>,
    pub enrolled_at: Timestamp,
}
