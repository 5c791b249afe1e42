#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use academy_api::auth::jwt::{generate_access_token, JwtConfig};
use academy_api::auth::password::hash_password;
use academy_api::config::ServerConfig;
use academy_api::router::build_app_router;
use academy_api::state::AppState;
use academy_db::models::user::{CreateUser, User};
use academy_db::repositories::UserRepo;
use academy_events::{Branding, Notifier};
use academy_payments::{IntentRequest, PaymentIntent, PaymentProcessor, StripeError};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "Str0ngPassw0rd!";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:19006".to_string()],
        request_timeout_secs: 30,
        min_password_length: 8,
        jwt: JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Card processor double.
///
/// `pi_ok_<cents>` intents have succeeded for `<cents>`, `pi_wait_*` intents
/// are still processing and every other id is unknown to the processor.
/// Created intents are immediately retrievable as succeeded.
pub struct FakeProcessor;

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn create_intent(&self, request: &IntentRequest) -> Result<PaymentIntent, StripeError> {
        let id = format!("pi_ok_{}", request.amount_cents);
        Ok(PaymentIntent {
            client_secret: Some(format!("{id}_secret_test")),
            id,
            amount: request.amount_cents,
            currency: "eur".into(),
            status: "requires_payment_method".into(),
            metadata: HashMap::new(),
        })
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        let (status, amount) = if let Some(cents) = id.strip_prefix("pi_ok_") {
            ("succeeded", cents.parse().unwrap_or(0))
        } else if id.starts_with("pi_wait_") {
            ("processing", 0)
        } else {
            return Err(StripeError::ApiError {
                status: 404,
                body: format!("No such payment_intent: '{id}'"),
            });
        };
        Ok(PaymentIntent {
            id: id.to_string(),
            amount,
            currency: "eur".into(),
            status: status.into(),
            client_secret: None,
            metadata: HashMap::new(),
        })
    }
}

/// Application state wired to the fake processor, without SMTP.
pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        notifier: Notifier::new(pool.clone()),
        pool,
        config: Arc::new(test_config()),
        email: None,
        processor: Some(Arc::new(FakeProcessor)),
        stripe_publishable_key: Some("pk_test_academy".to_string()),
        stripe_webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        branding: Branding::default(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(test_state(pool), &test_config()).expect("test router should build")
}

/// Same as [`build_test_app`] but with the card processor disabled.
pub fn build_test_app_without_stripe(pool: PgPool) -> Router {
    let mut state = test_state(pool);
    state.processor = None;
    state.stripe_publishable_key = None;
    build_app_router(state, &test_config()).expect("test router should build")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] directly in the database.
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        first_name: username.to_string(),
        last_name: "Tester".to_string(),
        role: role.to_string(),
        phone: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// A valid access token for `user`.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_config().jwt).expect("token should encode")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

/// POST with no body at all.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn delete_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::DELETE, uri, Some(token), Some(body)).await
}

/// POST a raw body with extra headers (webhook deliveries).
pub async fn post_raw(app: Router, uri: &str, body: Vec<u8>, headers: &[(&str, &str)]) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

// ---------------------------------------------------------------------------
// Catalogue fixtures via the API
// ---------------------------------------------------------------------------

/// Create a published course as `admin` and return its id.
pub async fn create_course(
    pool: &PgPool,
    admin_token: &str,
    body: serde_json::Value,
) -> i64 {
    let mut payload = serde_json::json!({ "title": "Clinical Pharmacology", "is_published": true });
    merge(&mut payload, body);
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/courses", payload, admin_token).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Add a lesson to a course as `admin` and return its id.
pub async fn create_lesson(pool: &PgPool, admin_token: &str, course_id: i64, title: &str) -> i64 {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/courses/{course_id}/lessons"),
        serde_json::json!({ "title": title }),
        admin_token,
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a published event a week from now as `admin` and return its id.
pub async fn create_event(pool: &PgPool, admin_token: &str, body: serde_json::Value) -> i64 {
    let start = chrono::Utc::now() + chrono::Duration::days(7);
    let end = start + chrono::Duration::hours(3);
    let mut payload = serde_json::json!({
        "title": "Annual Symposium",
        "start_date": start,
        "end_date": end,
        "is_published": true,
    });
    merge(&mut payload, body);
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/events", payload, admin_token).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn merge(target: &mut serde_json::Value, overrides: serde_json::Value) {
    if let (Some(target), serde_json::Value::Object(overrides)) =
        (target.as_object_mut(), overrides)
    {
        target.extend(overrides);
    }
}
