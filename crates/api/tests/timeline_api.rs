//! HTTP-level integration tests for posts, likes and comments.

mod common;

use academy_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use axum::http::StatusCode;
use common::{
    body_json, create_user, delete_auth, get, get_auth, post_auth, post_json_auth, put_json_auth,
    token_for,
};
use serde_json::json;
use sqlx::PgPool;

async fn create_post(pool: &PgPool, token: &str, content: &str) -> i64 {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/posts",
        json!({ "content": content }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn notification_messages(pool: &PgPool, user_id: i64, kind: &str) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT message FROM notifications
         WHERE user_id = $1 AND notification_type = $2
         ORDER BY id",
    )
    .bind(user_id)
    .bind(kind)
    .fetch_all(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_post_is_rejected(pool: PgPool) {
    let author = create_user(&pool, "author", ROLE_STUDENT).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/posts",
        json!({ "content": "   " }),
        &token_for(&author),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["content"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn like_is_idempotent_and_notifies_author(pool: PgPool) {
    let author = create_user(&pool, "author", ROLE_STUDENT).await;
    let fan = create_user(&pool, "fan", ROLE_STUDENT).await;
    let post_id = create_post(&pool, &token_for(&author), "First day on the ward").await;
    let like_uri = format!("/api/v1/posts/{post_id}/like");

    let response =
        post_auth(common::build_test_app(pool.clone()), &like_uri, &token_for(&fan)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["message"], "Post liked successfully.");
    assert_eq!(json["data"]["likes_count"], 1);

    let response =
        post_auth(common::build_test_app(pool.clone()), &like_uri, &token_for(&fan)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["message"], "You already liked this post.");
    assert_eq!(json["data"]["likes_count"], 1);

    assert_eq!(
        notification_messages(&pool, author.id, "post_like").await,
        vec!["fan Tester liked your post"]
    );

    // The viewer's own like is reflected in the detail.
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/posts/{post_id}"),
        &token_for(&fan),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["likes_count"], 1);
    assert_eq!(json["data"]["is_liked"], true);
    assert_eq!(json["data"]["author_username"], "author");

    let uri = format!("/api/v1/posts/{post_id}");
    let json = body_json(get(common::build_test_app(pool), &uri).await).await;
    assert_eq!(json["data"]["is_liked"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn self_like_does_not_notify(pool: PgPool) {
    let author = create_user(&pool, "author", ROLE_STUDENT).await;
    let token = token_for(&author);
    let post_id = create_post(&pool, &token, "Proud of this one").await;

    let response = post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/posts/{post_id}/like"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(notification_messages(&pool, author.id, "post_like").await.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unlike_requires_existing_like(pool: PgPool) {
    let author = create_user(&pool, "author", ROLE_STUDENT).await;
    let fan = create_user(&pool, "fan", ROLE_STUDENT).await;
    let post_id = create_post(&pool, &token_for(&author), "Case study").await;
    let unlike_uri = format!("/api/v1/posts/{post_id}/unlike");

    let response =
        post_auth(common::build_test_app(pool.clone()), &unlike_uri, &token_for(&fan)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "You have not liked this post.");

    post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/posts/{post_id}/like"),
        &token_for(&fan),
    )
    .await;
    let response = post_auth(common::build_test_app(pool), &unlike_uri, &token_for(&fan)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["message"], "Post unliked successfully.");
    assert_eq!(json["data"]["likes_count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn comment_notifies_author_with_preview(pool: PgPool) {
    let author = create_user(&pool, "author", ROLE_STUDENT).await;
    let reader = create_user(&pool, "reader", ROLE_STUDENT).await;
    let post_id = create_post(&pool, &token_for(&author), "Poster session photos").await;
    let long_comment = "a".repeat(60);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/posts/{post_id}/comments"),
        json!({ "content": long_comment }),
        &token_for(&reader),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let expected = format!("reader Tester commented: \"{}...\"", "a".repeat(50));
    assert_eq!(
        notification_messages(&pool, author.id, "post_comment").await,
        vec![expected]
    );

    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/posts/{post_id}/comments"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["author_username"], "reader");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_authors_edit_and_admins_moderate(pool: PgPool) {
    let author = create_user(&pool, "author", ROLE_STUDENT).await;
    let reader = create_user(&pool, "reader", ROLE_STUDENT).await;
    let admin = create_user(&pool, "admin", ROLE_ADMIN).await;
    let post_id = create_post(&pool, &token_for(&author), "Journal club notes").await;

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/posts/{post_id}"),
        json!({ "content": "Hijacked" }),
        &token_for(&reader),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/posts/{post_id}/comments"),
        json!({ "content": "Great summary" }),
        &token_for(&reader),
    )
    .await;
    let comment_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let comment_uri = format!("/api/v1/comments/{comment_id}");

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &comment_uri,
        json!({ "content": "Edited by someone else" }),
        &token_for(&author),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &comment_uri,
        json!({ "content": "Great summary, thanks" }),
        &token_for(&reader),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["content"], "Great summary, thanks");

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &comment_uri,
        &token_for(&author),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &comment_uri,
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/posts/{post_id}"),
        &token_for(&author),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get(common::build_test_app(pool), &format!("/api/v1/posts/{post_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
