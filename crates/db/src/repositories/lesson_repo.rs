//! Repository for the `lessons` table.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{CreateLesson, Lesson};

const COLUMNS: &str = "id, course_id, title, description, content_type, sort_order, \
                        video_url, pdf_url, duration_mins, is_free_preview, created_at, updated_at";

/// Provides CRUD operations for lessons.
pub struct LessonRepo;

impl LessonRepo {
    /// Insert a lesson into a course.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateLesson,
    ) -> Result<Lesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO lessons (course_id, title, description, content_type, sort_order,
                                  video_url, pdf_url, duration_mins, is_free_preview)
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, 'video'), COALESCE($5, 0),
                     $6, $7, COALESCE($8, 0), COALESCE($9, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.content_type)
            .bind(input.sort_order)
            .bind(&input.video_url)
            .bind(&input.pdf_url)
            .bind(input.duration_mins)
            .bind(input.is_free_preview)
            .fetch_one(pool)
            .await
    }

    /// Find a lesson by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a lesson only if it belongs to `course_id`.
    pub async fn find_in_course(
        pool: &PgPool,
        id: DbId,
        course_id: DbId,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1 AND course_id = $2");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Lessons of a course in display order, for the course detail payload.
    pub async fn list_for_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<Lesson>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lessons WHERE course_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Number of lessons in a course.
    pub async fn count_for_course(pool: &PgPool, course_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(pool)
            .await
    }
}
