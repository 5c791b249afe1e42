//! Repository for the `enrollments` and `lesson_progress` tables.

use academy_core::progress::{completion_percentage, COMPLETE_PERCENTAGE};
use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{
    Enrollment, EnrollmentActivation, LessonProgress, LessonProgressDetail, PaidOrder,
};
use crate::models::payment::PaymentStamp;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, student_id, course_id, is_active, progress_percentage, enrolled_at, \
                        completed_at, paid, amount_paid_cents, currency, payment_reference, \
                        qr_code, created_at, updated_at";

const PROGRESS_COLUMNS: &str =
    "id, enrollment_id, lesson_id, is_completed, completed_at, created_at, updated_at";

/// Provides enrollment lifecycle and progress operations.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Find an enrollment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The student's active enrollment in a course, if any.
    pub async fn find_active(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments
             WHERE student_id = $1 AND course_id = $2 AND is_active = true"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of active enrollments in a course.
    pub async fn count_active(pool: &PgPool, course_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = $1 AND is_active = true",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a new active enrollment or reactivate an inactive one.
    ///
    /// Payment fields are overwritten and any previous QR code is cleared.
    /// Returns `None` when the row is already active, which means another
    /// activation committed first.
    pub async fn activate(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        student_id: DbId,
        course_id: DbId,
        stamp: &PaymentStamp,
    ) -> Result<Option<EnrollmentActivation>, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (student_id, course_id, is_active, paid,
                                      amount_paid_cents, currency, payment_reference)
             VALUES ($1, $2, true, $3, $4, $5, $6)
             ON CONFLICT ON CONSTRAINT uq_enrollments_student_course DO UPDATE SET
                is_active = true,
                paid = EXCLUDED.paid,
                amount_paid_cents = EXCLUDED.amount_paid_cents,
                currency = EXCLUDED.currency,
                payment_reference = EXCLUDED.payment_reference,
                qr_code = NULL
             WHERE enrollments.is_active = false
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        sqlx::query_as::<_, EnrollmentActivation>(&query)
            .bind(student_id)
            .bind(course_id)
            .bind(stamp.paid)
            .bind(stamp.amount_cents)
            .bind(&stamp.currency)
            .bind(&stamp.reference)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Store the base64 QR ticket on an enrollment.
    pub async fn set_qr_code(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        qr_code: &str,
    ) -> Result<Enrollment, sqlx::Error> {
        let query =
            format!("UPDATE enrollments SET qr_code = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(qr_code)
            .fetch_one(&mut **tx)
            .await
    }

    /// Create one progress row per lesson of the course.
    ///
    /// Existing rows are left alone. Returns the number of rows created.
    pub async fn create_progress_rows(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        enrollment_id: DbId,
        course_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO lesson_progress (enrollment_id, lesson_id)
             SELECT $1, id FROM lessons WHERE course_id = $2
             ON CONFLICT ON CONSTRAINT uq_lesson_progress_enrollment_lesson DO NOTHING",
        )
        .bind(enrollment_id)
        .bind(course_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete the student's active enrollment. Returns `false` when none exists.
    pub async fn delete_active(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM enrollments
             WHERE student_id = $1 AND course_id = $2 AND is_active = true",
        )
        .bind(student_id)
        .bind(course_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Paid active enrollments with student and course, newest first.
    pub async fn list_paid_orders(pool: &PgPool) -> Result<Vec<PaidOrder>, sqlx::Error> {
        sqlx::query_as::<_, PaidOrder>(
            "SELECT e.id AS enrollment_id, c.id AS course_id, c.title AS course_title,
                    u.id AS student_id, u.email AS student_email,
                    u.first_name AS student_first_name, u.last_name AS student_last_name,
                    e.amount_paid_cents, e.currency, e.payment_reference, e.enrolled_at
             FROM enrollments e
             JOIN users u ON u.id = e.student_id
             JOIN courses c ON c.id = e.course_id
             WHERE e.paid = true AND e.is_active = true
             ORDER BY e.enrolled_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Progress rows of an enrollment in lesson order.
    pub async fn list_progress(
        pool: &PgPool,
        enrollment_id: DbId,
    ) -> Result<Vec<LessonProgressDetail>, sqlx::Error> {
        sqlx::query_as::<_, LessonProgressDetail>(
            "SELECT lp.id, lp.enrollment_id, lp.lesson_id, l.title AS lesson_title,
                    l.sort_order AS lesson_order, lp.is_completed, lp.completed_at
             FROM lesson_progress lp
             JOIN lessons l ON l.id = lp.lesson_id
             WHERE lp.enrollment_id = $1
             ORDER BY l.sort_order, l.id",
        )
        .bind(enrollment_id)
        .fetch_all(pool)
        .await
    }

    /// Mark a lesson complete for an enrollment, creating the row if needed.
    ///
    /// An already-completed row keeps its original `completed_at`.
    pub async fn complete_lesson(
        pool: &PgPool,
        enrollment_id: DbId,
        lesson_id: DbId,
    ) -> Result<LessonProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO lesson_progress (enrollment_id, lesson_id, is_completed, completed_at)
             VALUES ($1, $2, true, NOW())
             ON CONFLICT ON CONSTRAINT uq_lesson_progress_enrollment_lesson DO UPDATE SET
                is_completed = true,
                completed_at = COALESCE(lesson_progress.completed_at, NOW())
             RETURNING {PROGRESS_COLUMNS}"
        );
        sqlx::query_as::<_, LessonProgress>(&query)
            .bind(enrollment_id)
            .bind(lesson_id)
            .fetch_one(pool)
            .await
    }

    /// Recompute `progress_percentage` from completed rows over the course's lessons.
    ///
    /// When `stamp_completion` is set and the course reaches 100%, `completed_at`
    /// is stamped (if not already). A course without lessons is left unchanged.
    pub async fn recompute_progress(
        pool: &PgPool,
        enrollment_id: DbId,
        stamp_completion: bool,
    ) -> Result<Enrollment, sqlx::Error> {
        let (completed, total): (i64, i64) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM lesson_progress
                  WHERE enrollment_id = e.id AND is_completed = true),
                (SELECT COUNT(*) FROM lessons WHERE course_id = e.course_id)
             FROM enrollments e WHERE e.id = $1",
        )
        .bind(enrollment_id)
        .fetch_one(pool)
        .await?;

        let Some(percentage) = completion_percentage(completed, total) else {
            return Self::find_by_id(pool, enrollment_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound);
        };

        let query = format!(
            "UPDATE enrollments SET
                progress_percentage = $2,
                completed_at = CASE
                    WHEN $3 AND $2 >= {COMPLETE_PERCENTAGE} THEN COALESCE(completed_at, NOW())
                    ELSE completed_at
                END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(enrollment_id)
            .bind(percentage)
            .bind(stamp_completion)
            .fetch_one(pool)
            .await
    }

    /// Stamp `completed_at` if unset. Returns `true` only for the call that stamped it.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE enrollments SET completed_at = NOW() WHERE id = $1 AND completed_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
