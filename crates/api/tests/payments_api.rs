//! HTTP-level integration tests for the card processor webhook.

mod common;

use academy_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use academy_core::signature::sign_header;
use axum::http::StatusCode;
use common::{
    body_json, create_course, create_event, create_user, post_raw, token_for, WEBHOOK_SECRET,
};
use serde_json::{json, Value};
use sqlx::PgPool;

const WEBHOOK_URI: &str = "/api/v1/payments/webhook";

async fn deliver(pool: &PgPool, payload: &Value) -> axum::response::Response {
    let body = payload.to_string().into_bytes();
    let header = sign_header(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), &body);
    post_raw(
        common::build_test_app(pool.clone()),
        WEBHOOK_URI,
        body,
        &[("stripe-signature", header.as_str())],
    )
    .await
}

fn intent_succeeded(metadata: Value) -> Value {
    json!({
        "type": "payment_intent.succeeded",
        "data": { "object": {
            "id": "pi_webhook_1",
            "amount": 4900,
            "currency": "eur",
            "metadata": metadata,
        }},
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn succeeded_intent_activates_enrollment_once(pool: PgPool) {
    let admin = create_user(&pool, "admin", ROLE_ADMIN).await;
    let student = create_user(&pool, "student", ROLE_STUDENT).await;
    let course_id = create_course(&pool, &token_for(&admin), json!({ "price_cents": 4900 })).await;
    let payload = intent_succeeded(json!({
        "type": "course",
        "user_id": student.id.to_string(),
        "course_id": course_id.to_string(),
    }));

    let response = deliver(&pool, &payload).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["message"], "Webhook received.");

    // Redelivery of the same event is acknowledged without a second row.
    let response = deliver(&pool, &payload).await;
    assert_eq!(response.status(), StatusCode::OK);

    let rows: Vec<(bool, Option<i64>, String, Option<String>)> = sqlx::query_as(
        "SELECT paid, amount_paid_cents, currency, payment_reference
         FROM enrollments WHERE student_id = $1 AND course_id = $2",
    )
    .bind(student.id)
    .bind(course_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(
        rows,
        vec![(true, Some(4900), "EUR".to_string(), Some("pi_webhook_1".to_string()))]
    );

    let types: Vec<String> = sqlx::query_scalar(
        "SELECT notification_type FROM notifications WHERE user_id = $1 ORDER BY id",
    )
    .bind(student.id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(types, vec!["course_enrollment", "payment_success"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn checkout_session_registers_for_event(pool: PgPool) {
    let admin = create_user(&pool, "admin", ROLE_ADMIN).await;
    let student = create_user(&pool, "student", ROLE_STUDENT).await;
    let event_id = create_event(&pool, &token_for(&admin), json!({ "price_cents": 15000 })).await;
    let payload = json!({
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_1",
            "amount_total": 15000,
            "currency": "eur",
            "metadata": {
                "type": "event",
                "user_id": student.id.to_string(),
                "event_id": event_id.to_string(),
            },
        }},
    });

    let response = deliver(&pool, &payload).await;
    assert_eq!(response.status(), StatusCode::OK);

    let paid: bool = sqlx::query_scalar(
        "SELECT paid FROM event_registrations WHERE attendee_id = $1 AND event_id = $2",
    )
    .bind(student.id)
    .bind(event_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(paid);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_signature_is_rejected(pool: PgPool) {
    let body = intent_succeeded(json!({})).to_string().into_bytes();
    let forged = sign_header("whsec_wrong", chrono::Utc::now().timestamp(), &body);

    let response = post_raw(
        common::build_test_app(pool.clone()),
        WEBHOOK_URI,
        body.clone(),
        &[("stripe-signature", forged.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_raw(common::build_test_app(pool), WEBHOOK_URI, body, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unhandled_events_are_acknowledged(pool: PgPool) {
    let payload = json!({
        "type": "charge.refunded",
        "data": { "object": { "id": "ch_1" } },
    });
    let response = deliver(&pool, &payload).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["message"], "Webhook received.");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unusable_metadata_is_acknowledged(pool: PgPool) {
    let student = create_user(&pool, "student", ROLE_STUDENT).await;

    // No metadata at all.
    let response = deliver(&pool, &intent_succeeded(Value::Null)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Metadata naming a course that does not exist.
    let payload = intent_succeeded(json!({
        "type": "course",
        "user_id": student.id.to_string(),
        "course_id": "424242",
    }));
    let response = deliver(&pool, &payload).await;
    assert_eq!(response.status(), StatusCode::OK);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}
