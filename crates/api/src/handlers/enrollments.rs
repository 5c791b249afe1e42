//! Handlers for `/enrollments`: progress, lesson completion, certificates
//! and the admin paid-orders view.

use academy_core::progress::is_complete;
use academy_core::types::DbId;
use academy_db::models::course::{Enrollment, LessonProgressDetail, PaidOrder};
use academy_db::repositories::{CourseRepo, EnrollmentRepo, LessonRepo, UserRepo};
use academy_events::delivery::email::send_best_effort;
use academy_events::notifier;
use academy_events::templates::{self, CertificateNotice};
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::courses::LessonCompletion;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::purchase::{instructor_name, lesson_count};
use crate::response::DataResponse;
use crate::state::AppState;

const CERTIFICATE_DATE_FORMAT: &str = "%B %d, %Y";

/// Certificate data for a completed course.
#[derive(Debug, Serialize)]
pub struct Certificate {
    pub certificate_id: String,
    pub student_name: String,
    pub course_title: String,
    pub completion_date: String,
    pub instructor_name: Option<String>,
    pub progress: i32,
    pub issued_date: String,
}

/// GET /api/v1/enrollments/paid-orders
pub async fn paid_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<PaidOrder>>>> {
    let orders = EnrollmentRepo::list_paid_orders(&state.pool).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/enrollments/{id}/progress
pub async fn progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<LessonProgressDetail>>>> {
    let enrollment = owned_enrollment(&state, &auth, id).await?;
    let rows = EnrollmentRepo::list_progress(&state.pool, enrollment.id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/enrollments/{id}/lessons/{lesson_id}/complete
pub async fn complete_lesson(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, lesson_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<LessonCompletion>>> {
    let enrollment = owned_enrollment(&state, &auth, id).await?;

    let lesson = LessonRepo::find_in_course(&state.pool, lesson_id, enrollment.course_id)
        .await?
        .ok_or(AppError::not_found("Lesson", lesson_id))?;

    EnrollmentRepo::complete_lesson(&state.pool, enrollment.id, lesson.id).await?;
    let enrollment = EnrollmentRepo::recompute_progress(&state.pool, enrollment.id, false).await?;

    Ok(Json(DataResponse {
        data: LessonCompletion {
            message: "Lesson marked as complete".into(),
            progress_percentage: enrollment.progress_percentage,
        },
    }))
}

/// GET /api/v1/enrollments/{id}/certificate
///
/// The first request for a fully completed course stamps `completed_at`,
/// emails the certificate and notifies the student.
pub async fn certificate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Certificate>>> {
    let enrollment = owned_enrollment(&state, &auth, id).await?;
    if !is_complete(enrollment.progress_percentage) {
        return Err(AppError::BadRequest(
            "Course must be 100% complete to generate certificate".into(),
        ));
    }

    let first_issue = EnrollmentRepo::mark_completed(&state.pool, enrollment.id).await?;
    let enrollment = EnrollmentRepo::find_by_id(&state.pool, enrollment.id)
        .await?
        .ok_or(AppError::not_found("Enrollment", id))?;

    let course = CourseRepo::find_by_id(&state.pool, enrollment.course_id)
        .await?
        .ok_or(AppError::not_found("Course", enrollment.course_id))?;
    let student = UserRepo::find_by_id(&state.pool, enrollment.student_id)
        .await?
        .ok_or(AppError::not_found("User", enrollment.student_id))?;
    let instructor = instructor_name(&state, course.teacher_id).await;

    let completed_at = enrollment.completed_at.unwrap_or(enrollment.updated_at);
    let certificate_id = format!("CERT-{}", enrollment.id);

    if first_issue {
        let notice = CertificateNotice {
            to: student.email.clone(),
            user_name: student.display_name(),
            course_id: course.id,
            course_title: course.title.clone(),
            certificate_id: certificate_id.clone(),
            completed_at,
            instructor_name: instructor.clone(),
            lesson_count: lesson_count(&state, course.id).await,
            duration_weeks: course.duration_weeks,
        };
        send_best_effort(state.email(), &templates::certificate(&state.branding, &notice)).await;
        state
            .notifier
            .send(notifier::certificate_ready(
                student.id,
                enrollment.id,
                &course.title,
            ))
            .await;
        tracing::info!(enrollment_id = enrollment.id, "Certificate issued");
    }

    Ok(Json(DataResponse {
        data: Certificate {
            certificate_id,
            student_name: student.display_name(),
            course_title: course.title,
            completion_date: completed_at.format(CERTIFICATE_DATE_FORMAT).to_string(),
            instructor_name: instructor,
            progress: enrollment.progress_percentage,
            issued_date: Utc::now().format(CERTIFICATE_DATE_FORMAT).to_string(),
        },
    }))
}

/// Load an enrollment the caller owns (or any, for admins).
async fn owned_enrollment(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Enrollment> {
    let enrollment = EnrollmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Enrollment", id))?;
    if !auth.can_access(enrollment.student_id) {
        return Err(AppError::forbidden(
            "You do not have permission to access this enrollment.",
        ));
    }
    Ok(enrollment)
}
