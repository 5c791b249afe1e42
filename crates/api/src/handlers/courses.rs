//! Handlers for `/courses` and `/lessons`.

use academy_core::types::DbId;
use academy_db::models::course::{Course, CreateCourse, CreateLesson, Lesson, UpdateCourse};
use academy_db::repositories::{CourseRepo, EnrollmentRepo, LessonRepo, UserRepo};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::payments::{self, PaymentIntentResponse};
use crate::handlers::{optional_json, require_text};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::rbac::RequireAdmin;
use crate::purchase::{self, PurchasableItem, PurchaseRecord};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Published course with its lessons and the caller's enrollment state.
#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub lessons: Vec<Lesson>,
    pub enrolled_count: i64,
    pub is_full: bool,
    pub is_enrolled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnrollRequest {
    #[serde(default)]
    pub simulate_payment: bool,
}

/// Result of completing a lesson.
#[derive(Debug, Serialize)]
pub struct LessonCompletion {
    pub message: String,
    pub progress_percentage: i32,
}

// ---------------------------------------------------------------------------
// Course CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/courses
pub async fn create_course(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    require_text("title", &input.title)?;
    if input.price_cents.is_some_and(|p| p < 0) {
        return Err(AppError::field(
            "price_cents",
            "Ensure this value is greater than or equal to 0.",
        ));
    }

    let course = CourseRepo::create(&state.pool, admin.user_id, &input).await?;
    tracing::info!(course_id = course.id, teacher_id = admin.user_id, "Course created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// GET /api/v1/courses/{id}
///
/// Unpublished courses are visible to admins only.
pub async fn get_course(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseDetail>>> {
    let is_admin = viewer.0.as_ref().is_some_and(AuthUser::is_admin);
    let course = if is_admin {
        CourseRepo::find_by_id(&state.pool, id).await?
    } else {
        CourseRepo::find_published(&state.pool, id).await?
    }
    .ok_or(AppError::not_found("Course", id))?;

    let lessons = LessonRepo::list_for_course(&state.pool, id).await?;
    let enrolled_count = EnrollmentRepo::count_active(&state.pool, id).await?;
    let is_enrolled = match viewer.user_id() {
        Some(user_id) => EnrollmentRepo::find_active(&state.pool, user_id, id)
            .await?
            .is_some(),
        None => false,
    };

    Ok(Json(DataResponse {
        data: CourseDetail {
            is_full: course.is_full(enrolled_count),
            course,
            lessons,
            enrolled_count,
            is_enrolled,
        },
    }))
}

/// PUT /api/v1/courses/{id}
pub async fn update_course(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    if let Some(title) = &input.title {
        require_text("title", title)?;
    }
    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Course", id))?;
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
pub async fn delete_course(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CourseRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Course", id));
    }
    tracing::info!(course_id = id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/courses/{id}/lessons
pub async fn create_lesson(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateLesson>,
) -> AppResult<(StatusCode, Json<DataResponse<Lesson>>)> {
    require_text("title", &input.title)?;
    CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::not_found("Course", course_id))?;

    let lesson = LessonRepo::create(&state.pool, course_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lesson })))
}

// ---------------------------------------------------------------------------
// Purchase
// ---------------------------------------------------------------------------

/// POST /api/v1/courses/{id}/payment-intent
pub async fn create_payment_intent(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PaymentIntentResponse>>> {
    let item = PurchasableItem::Course(published_course(&state, id).await?);
    payments::start_intent(&state, auth.user_id, &item).await
}

/// POST /api/v1/courses/{id}/confirm-payment
pub async fn confirm_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<PurchaseRecord>>)> {
    let item = PurchasableItem::Course(published_course(&state, id).await?);
    payments::confirm_from_body(&state, auth.user_id, &item, &body).await
}

/// POST /api/v1/courses/{id}/enroll
pub async fn enroll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<PurchaseRecord>>)> {
    let input: EnrollRequest = optional_json(&body)?;
    let course = published_course(&state, id).await?;
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::not_found("User", auth.user_id))?;

    let record = purchase::enroll(&state, &user, course, input.simulate_payment).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// POST /api/v1/courses/{id}/unenroll
pub async fn unenroll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Course", id))?;

    if !EnrollmentRepo::delete_active(&state.pool, auth.user_id, id).await? {
        return Err(AppError::BadRequest(
            "You are not enrolled in this course.".into(),
        ));
    }
    tracing::info!(user_id = auth.user_id, course_id = id, "Unenrolled");

    Ok(Json(DataResponse {
        data: MessageResponse::new("Successfully unenrolled from the course."),
    }))
}

/// POST /api/v1/lessons/{id}/complete
///
/// Completes the lesson for the caller's active enrollment and stamps
/// `completed_at` once the course reaches 100%.
pub async fn complete_lesson(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(lesson_id): Path<DbId>,
) -> AppResult<Json<DataResponse<LessonCompletion>>> {
    let lesson = LessonRepo::find_by_id(&state.pool, lesson_id)
        .await?
        .ok_or(AppError::not_found("Lesson", lesson_id))?;

    let enrollment = EnrollmentRepo::find_active(&state.pool, auth.user_id, lesson.course_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("You are not enrolled in this course.".into()))?;

    EnrollmentRepo::complete_lesson(&state.pool, enrollment.id, lesson.id).await?;
    let enrollment = EnrollmentRepo::recompute_progress(&state.pool, enrollment.id, true).await?;

    tracing::info!(
        enrollment_id = enrollment.id,
        lesson_id,
        progress = enrollment.progress_percentage,
        "Lesson completed"
    );

    Ok(Json(DataResponse {
        data: LessonCompletion {
            message: "Lesson marked as complete".into(),
            progress_percentage: enrollment.progress_percentage,
        },
    }))
}

async fn published_course(state: &AppState, id: DbId) -> AppResult<Course> {
    CourseRepo::find_published(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Course", id))
}
