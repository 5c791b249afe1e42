//! Handlers for the `/auth` resource: registration, login, token rotation,
//! profile, password change and reset, account deletion.

use std::collections::BTreeMap;

use academy_core::error::CoreError;
use academy_core::roles::ROLE_STUDENT;
use academy_core::types::DbId;
use academy_core::validation::{
    generate_reset_code, is_valid_reset_code, normalize_email, reset_code_expired,
    validate_email, validate_password_match, validate_password_strength, validate_username,
};
use academy_db::models::session::CreateSession;
use academy_db::models::user::{CreateUser, UpdateProfile, User, UserResponse};
use academy_db::repositories::{PasswordResetRepo, SessionRepo, UserRepo};
use academy_events::delivery::email::send_best_effort;
use academy_events::templates;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::handlers::optional_json;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const RESET_REQUESTED: &str = "Password reset code has been sent to your email.";
const INVALID_RESET_CODE: &str = "Invalid or expired reset code.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub username: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub email: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password2: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Optional body for `POST /auth/logout`.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password2: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
    pub new_password2: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserResponse,
    pub tokens: TokenPair,
}

// ---------------------------------------------------------------------------
// Registration and sessions
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthPayload>>)> {
    input.validate()?;

    let email = normalize_email(&input.email);
    let username = input.username.trim().to_string();

    let mut fields = BTreeMap::new();
    if let Err(msg) = validate_username(&username) {
        fields.insert("username".to_string(), msg);
    }
    if let Err(msg) = validate_email(&email) {
        fields.insert("email".to_string(), msg);
    }
    let min_length = state.config.min_password_length;
    if let Err(msg) = validate_password_match(&input.password, &input.password2)
        .and_then(|()| validate_password_strength(&input.password, min_length))
    {
        fields.insert("password".to_string(), msg);
    }
    if fields.is_empty() {
        let (email_taken, username_taken) =
            UserRepo::email_or_username_taken(&state.pool, &email, &username).await?;
        if email_taken {
            fields.insert(
                "email".to_string(),
                "A user with that email already exists.".to_string(),
            );
        }
        if username_taken {
            fields.insert(
                "username".to_string(),
                "A user with that username already exists.".to_string(),
            );
        }
    }
    if !fields.is_empty() {
        return Err(AppError::FieldErrors(fields));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            email,
            password_hash,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            role: ROLE_STUDENT.to_string(),
            phone: input.phone.filter(|p| !p.trim().is_empty()),
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User registered");

    let welcome = templates::welcome(&state.branding, &user.email, &user.display_name());
    send_best_effort(state.email(), &welcome).await;

    let payload = issue_tokens(&state, user, user_agent(&headers)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: payload })))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Locks the account for
/// [`LOCK_DURATION_MINS`] after [`MAX_FAILED_ATTEMPTS`] failures.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthPayload>>> {
    let email = normalize_email(&input.email);
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::forbidden(
                "Account is temporarily locked. Try again later.",
            ));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, failures, "Account locked after failed logins");
        }
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    let payload = issue_tokens(&state, user, user_agent(&headers)).await?;
    Ok(Json(DataResponse { data: payload }))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for a new pair. The old session is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthPayload>>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    let payload = issue_tokens(&state, user, user_agent(&headers)).await?;
    Ok(Json(DataResponse { data: payload }))
}

/// POST /api/v1/auth/logout
///
/// Revokes the supplied refresh token, or every session when none is given.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let input: LogoutRequest = optional_json(&body)?;

    match input.refresh_token.filter(|t| !t.is_empty()) {
        Some(token) => {
            let hash = hash_refresh_token(&token);
            SessionRepo::revoke_by_hash(&state.pool, auth.user_id, &hash).await?;
        }
        None => {
            let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
            tracing::debug!(user_id = auth.user_id, revoked, "Revoked all sessions");
        }
    }

    Ok(Json(DataResponse {
        data: MessageResponse::new("Successfully logged out."),
    }))
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// GET /api/v1/auth/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state, auth.user_id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT|PATCH /api/v1/auth/profile
///
/// Only the fields present in the body are changed.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("User", auth.user_id))?;
    Ok(Json(DataResponse { data: user.into() }))
}

// ---------------------------------------------------------------------------
// Passwords
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let user = load_user(&state, auth.user_id).await?;

    let old_valid = verify_password(&input.old_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !old_valid {
        return Err(AppError::field("old_password", "Wrong password."));
    }

    check_new_password(&state, &input.new_password, &input.new_password2)?;
    set_password(&state, user.id, &input.new_password).await?;
    tracing::info!(user_id = user.id, "Password changed");

    Ok(Json(DataResponse {
        data: MessageResponse::new("Password updated successfully."),
    }))
}

/// POST /api/v1/auth/password-reset
///
/// Responds identically whether or not the address belongs to an account.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let email = normalize_email(&input.email);

    if let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? {
        let code = generate_reset_code();
        PasswordResetRepo::create(&state.pool, user.id, &code).await?;
        let message =
            templates::password_reset(&state.branding, &user.email, &user.display_name(), &code);
        send_best_effort(state.email(), &message).await;
        tracing::info!(user_id = user.id, "Password reset code issued");
    }

    Ok(Json(DataResponse {
        data: MessageResponse::new(RESET_REQUESTED),
    }))
}

/// POST /api/v1/auth/password-reset-confirm
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetConfirmRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let code = input.token.trim();
    if !is_valid_reset_code(code) {
        return Err(AppError::BadRequest(INVALID_RESET_CODE.into()));
    }

    let email = normalize_email(&input.email);
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid email address.".into()))?;

    let reset = PasswordResetRepo::find_latest_unused(&state.pool, user.id, code)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_RESET_CODE.into()))?;

    if reset_code_expired(reset.created_at, Utc::now()) {
        return Err(AppError::BadRequest(
            "Reset code has expired. Please request a new one.".into(),
        ));
    }

    check_new_password(&state, &input.new_password, &input.new_password2)?;

    if !PasswordResetRepo::mark_used(&state.pool, reset.id).await? {
        return Err(AppError::BadRequest(INVALID_RESET_CODE.into()));
    }
    set_password(&state, user.id, &input.new_password).await?;
    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "Password reset completed");

    Ok(Json(DataResponse {
        data: MessageResponse::new("Password has been reset successfully."),
    }))
}

/// DELETE /api/v1/auth/delete-account
///
/// Requires the current password. Owned rows cascade with the user.
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let input: DeleteAccountRequest = optional_json(&body)?;

    let password = input.password.filter(|p| !p.is_empty()).ok_or_else(|| {
        AppError::BadRequest("Password confirmation is required to delete your account.".into())
    })?;

    let user = load_user(&state, auth.user_id).await?;
    let valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(AppError::BadRequest(
            "Incorrect password. Please try again.".into(),
        ));
    }

    let farewell = templates::account_deleted(&state.branding, &user.email, &user.display_name());
    send_best_effort(state.email(), &farewell).await;

    UserRepo::delete(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "Account deleted");

    Ok(Json(DataResponse {
        data: MessageResponse::new(
            "Your account has been permanently deleted. We're sorry to see you go.",
        ),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_user(state: &AppState, user_id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::not_found("User", user_id))
}

fn check_new_password(state: &AppState, password: &str, confirmation: &str) -> AppResult<()> {
    validate_password_match(password, confirmation)
        .map_err(|msg| AppError::field("new_password2", msg))?;
    validate_password_strength(password, state.config.min_password_length)
        .map_err(|msg| AppError::field("new_password", msg))
}

async fn set_password(state: &AppState, user_id: DbId, password: &str) -> AppResult<()> {
    let hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user_id, &hash).await?;
    Ok(())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Generate access + refresh tokens and persist a session row.
async fn issue_tokens(
    state: &AppState,
    user: User,
    user_agent: Option<String>,
) -> AppResult<AuthPayload> {
    let access = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh, refresh_token_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash,
            expires_at,
            user_agent,
            ip_address: None,
        },
    )
    .await?;

    Ok(AuthPayload {
        user: user.into(),
        tokens: TokenPair { access, refresh },
    })
}
