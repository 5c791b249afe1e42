//! HTTP-level integration tests for the `/auth` endpoints.
//!
//! Covers registration validation, login and lockout, refresh-token
//! rotation, logout, profile updates, password change and reset, and
//! account deletion.

mod common;

use academy_core::roles::ROLE_STUDENT;
use academy_db::repositories::UserRepo;
use axum::http::StatusCode;
use common::{
    body_json, create_user, delete_json_auth, get_auth, post_json, post_json_auth, token_for,
    TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

async fn login(pool: &PgPool, email: &str, password: &str) -> axum::response::Response {
    post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_student_and_returns_tokens(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = json!({
        "username": "ada",
        "email": "Ada@Example.com",
        "password": "analytical-engine",
        "password2": "analytical-engine",
        "first_name": "Ada",
        "last_name": "Lovelace",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["username"], "ada");
    assert_eq!(json["data"]["user"]["email"], "ada@example.com");
    assert_eq!(json["data"]["user"]["role"], ROLE_STUDENT);
    assert!(json["data"]["user"].get("password_hash").is_none());
    assert!(json["data"]["tokens"]["access"].is_string());
    assert!(json["data"]["tokens"]["refresh"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_reports_field_errors(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "username": "grace",
        "email": "not-an-email",
        "password": "short",
        "password2": "different",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["email"].is_string());
    assert!(json["fields"]["password"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_taken_email(pool: PgPool) {
    create_user(&pool, "taken", ROLE_STUDENT).await;

    let app = common::build_test_app(pool);
    let body = json!({
        "username": "someone_else",
        "email": "taken@example.com",
        "password": "long-enough-pw",
        "password2": "long-enough-pw",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["fields"]["email"], "A user with that email already exists.");
}

// ---------------------------------------------------------------------------
// Login, lockout, refresh, logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_success_returns_user_and_tokens(pool: PgPool) {
    let user = create_user(&pool, "login_ok", ROLE_STUDENT).await;

    let response = login(&pool, "login_ok@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert!(json["data"]["tokens"]["access"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_wrong_password_is_401(pool: PgPool) {
    create_user(&pool, "wrongpw", ROLE_STUDENT).await;

    let response = login(&pool, "wrongpw@example.com", "incorrect").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid credentials");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_unknown_email_is_401(pool: PgPool) {
    let response = login(&pool, "ghost@example.com", "whatever").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_deactivated_account_is_403(pool: PgPool) {
    let user = create_user(&pool, "inactive", ROLE_STUDENT).await;
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let response = login(&pool, "inactive@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn five_failures_lock_the_account(pool: PgPool) {
    let user = create_user(&pool, "locked", ROLE_STUDENT).await;

    for _ in 0..5 {
        let response = login(&pool, "locked@example.com", "bad-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // The correct password no longer works while locked.
    let response = login(&pool, "locked@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let row = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(row.locked_until.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_the_session(pool: PgPool) {
    create_user(&pool, "rotator", ROLE_STUDENT).await;
    let json = body_json(login(&pool, "rotator@example.com", TEST_PASSWORD).await).await;
    let refresh_token = json["data"]["tokens"]["refresh"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["data"]["tokens"]["refresh"], refresh_token.as_str());

    // The old token was revoked by the rotation.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_without_body_revokes_all_sessions(pool: PgPool) {
    let user = create_user(&pool, "leaver", ROLE_STUDENT).await;
    let json = body_json(login(&pool, "leaver@example.com", TEST_PASSWORD).await).await;
    let refresh_token = json["data"]["tokens"]["refresh"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = common::post_auth(app, "/api/v1/auth/logout", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["message"],
        "Successfully logged out."
    );

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_route_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/auth/profile").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Profile and password
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_partial_update(pool: PgPool) {
    let user = create_user(&pool, "profiled", ROLE_STUDENT).await;
    let token = token_for(&user);

    let app = common::build_test_app(pool.clone());
    let response = common::put_json_auth(
        app,
        "/api/v1/auth/profile",
        json!({ "bio": "Pharmacist", "city": "Lisbon" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/auth/profile", &token).await).await;
    assert_eq!(json["data"]["bio"], "Pharmacist");
    assert_eq!(json["data"]["city"], "Lisbon");
    assert_eq!(json["data"]["first_name"], "profiled");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_password_checks_old_password(pool: PgPool) {
    let user = create_user(&pool, "changer", ROLE_STUDENT).await;
    let token = token_for(&user);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/auth/change-password",
        json!({
            "old_password": "not-my-password",
            "new_password": "brand-new-secret",
            "new_password2": "brand-new-secret",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["fields"]["old_password"],
        "Wrong password."
    );

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/auth/change-password",
        json!({
            "old_password": TEST_PASSWORD,
            "new_password": "brand-new-secret",
            "new_password2": "brand-new-secret",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = login(&pool, "changer@example.com", "brand-new-secret").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_request_does_not_leak_accounts(pool: PgPool) {
    create_user(&pool, "resetme", ROLE_STUDENT).await;

    let known = body_json(
        post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/auth/password-reset",
            json!({ "email": "resetme@example.com" }),
        )
        .await,
    )
    .await;
    let unknown = body_json(
        post_json(
            common::build_test_app(pool),
            "/api/v1/auth/password-reset",
            json!({ "email": "nobody@example.com" }),
        )
        .await,
    )
    .await;

    assert_eq!(known, unknown);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_confirm_sets_new_password(pool: PgPool) {
    let user = create_user(&pool, "forgetful", ROLE_STUDENT).await;
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/password-reset",
        json!({ "email": "forgetful@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let code: String = sqlx::query_scalar(
        "SELECT token FROM password_reset_tokens
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT 1",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/password-reset-confirm",
        json!({
            "email": "forgetful@example.com",
            "token": code,
            "new_password": "remembered-now",
            "new_password2": "remembered-now",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A used code cannot be replayed.
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/password-reset-confirm",
        json!({
            "email": "forgetful@example.com",
            "token": code,
            "new_password": "another-password",
            "new_password2": "another-password",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = login(&pool, "forgetful@example.com", "remembered-now").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_confirm_rejects_malformed_code(pool: PgPool) {
    create_user(&pool, "malformed", ROLE_STUDENT).await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/password-reset-confirm",
        json!({
            "email": "malformed@example.com",
            "token": "abc",
            "new_password": "remembered-now",
            "new_password2": "remembered-now",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid or expired reset code."
    );
}

// ---------------------------------------------------------------------------
// Account deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_account_requires_correct_password(pool: PgPool) {
    let user = create_user(&pool, "quitter", ROLE_STUDENT).await;
    let token = token_for(&user);

    let response = delete_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/delete-account",
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/delete-account",
        json!({ "password": "wrong" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Incorrect password. Please try again."
    );

    let response = delete_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/delete-account",
        json!({ "password": TEST_PASSWORD }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(UserRepo::find_by_id(&pool, user.id).await.unwrap().is_none());
}
