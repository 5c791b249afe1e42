//! Repository for the `courses` table.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, UpdateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, short_description, price_cents, currency, \
                        image_url, teacher_id, category, level, is_online, is_in_person, \
                        is_published, duration_weeks, max_students, created_at, updated_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course taught by `teacher_id`.
    pub async fn create(
        pool: &PgPool,
        teacher_id: DbId,
        input: &CreateCourse,
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (title, description, short_description, price_cents, currency,
                                  image_url, teacher_id, category, level, is_online,
                                  is_in_person, is_published, duration_weeks, max_students)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, 0), COALESCE($5, 'EUR'),
                     $6, $7, COALESCE($8, 'other'), COALESCE($9, 'beginner'), COALESCE($10, true),
                     COALESCE($11, false), COALESCE($12, false), COALESCE($13, 0), COALESCE($14, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.short_description)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.image_url)
            .bind(teacher_id)
            .bind(&input.category)
            .bind(&input.level)
            .bind(input.is_online)
            .bind(input.is_in_person)
            .bind(input.is_published)
            .bind(input.duration_weeks)
            .bind(input.max_students)
            .fetch_one(pool)
            .await
    }

    /// Find a course by ID regardless of publication state.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a published course by ID.
    pub async fn find_published(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1 AND is_published = true");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                short_description = COALESCE($4, short_description),
                price_cents = COALESCE($5, price_cents),
                currency = COALESCE($6, currency),
                image_url = COALESCE($7, image_url),
                category = COALESCE($8, category),
                level = COALESCE($9, level),
                is_online = COALESCE($10, is_online),
                is_in_person = COALESCE($11, is_in_person),
                is_published = COALESCE($12, is_published),
                duration_weeks = COALESCE($13, duration_weeks),
                max_students = COALESCE($14, max_students)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.short_description)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.image_url)
            .bind(&input.category)
            .bind(&input.level)
            .bind(input.is_online)
            .bind(input.is_in_person)
            .bind(input.is_published)
            .bind(input.duration_weeks)
            .bind(input.max_students)
            .fetch_optional(pool)
            .await
    }

    /// Delete a course; lessons and enrollments cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
