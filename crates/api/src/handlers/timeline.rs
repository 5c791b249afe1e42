//! Handlers for `/posts` and `/comments`.

use academy_core::types::DbId;
use academy_db::models::timeline::{
    Comment, CommentInput, CommentWithAuthor, CreatePost, Post, PostDetail, UpdatePost,
};
use academy_db::repositories::{CommentRepo, LikeRepo, PostRepo, UserRepo};
use academy_events::notifier;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::require_text;
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of liking or unliking a post.
#[derive(Debug, Serialize)]
pub struct LikeResult {
    pub message: String,
    pub likes_count: i64,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// POST /api/v1/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreatePost>,
) -> AppResult<(StatusCode, Json<DataResponse<Post>>)> {
    require_text("content", &input.content)?;
    let post = PostRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PostDetail>>> {
    let detail = PostRepo::find_detail(&state.pool, id, viewer.user_id())
        .await?
        .ok_or(AppError::not_found("Post", id))?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePost>,
) -> AppResult<Json<DataResponse<Post>>> {
    authored_post(&state, &auth, id).await?;
    if let Some(content) = &input.content {
        require_text("content", content)?;
    }

    let post = PostRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Post", id))?;
    Ok(Json(DataResponse { data: post }))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authored_post(&state, &auth, id).await?;
    PostRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn authored_post(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Post> {
    let post = PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Post", id))?;
    if post.author_id != auth.user_id {
        return Err(AppError::forbidden("You can only modify your own posts."));
    }
    Ok(post)
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

/// POST /api/v1/posts/{id}/like
///
/// 201 for a new like, 200 when the caller already liked the post.
pub async fn like_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<LikeResult>>)> {
    let post = PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Post", id))?;

    let created = LikeRepo::create_if_absent(&state.pool, post.id, auth.user_id).await?;
    let likes_count = LikeRepo::count_for_post(&state.pool, post.id).await?;

    if created.is_none() {
        return Ok((
            StatusCode::OK,
            Json(DataResponse {
                data: LikeResult {
                    message: "You already liked this post.".into(),
                    likes_count,
                },
            }),
        ));
    }

    if post.author_id != auth.user_id {
        let liker = actor_name(&state, auth.user_id).await?;
        state
            .notifier
            .send_opt(notifier::post_like(post.author_id, post.id, auth.user_id, &liker))
            .await;
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: LikeResult {
                message: "Post liked successfully.".into(),
                likes_count,
            },
        }),
    ))
}

/// POST /api/v1/posts/{id}/unlike
pub async fn unlike_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LikeResult>>> {
    PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Post", id))?;

    if !LikeRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(AppError::BadRequest("You have not liked this post.".into()));
    }
    let likes_count = LikeRepo::count_for_post(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: LikeResult {
            message: "Post unliked successfully.".into(),
            likes_count,
        },
    }))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// GET /api/v1/posts/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CommentWithAuthor>>>> {
    PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Post", id))?;
    let comments = CommentRepo::list_for_post(&state.pool, id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/posts/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CommentInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    require_text("content", &input.content)?;
    let post = PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Post", id))?;

    let comment = CommentRepo::create(&state.pool, post.id, auth.user_id, &input.content).await?;

    if post.author_id != auth.user_id {
        let commenter = actor_name(&state, auth.user_id).await?;
        state
            .notifier
            .send_opt(notifier::post_comment(
                post.author_id,
                post.id,
                auth.user_id,
                &commenter,
                &comment.content,
            ))
            .await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// PUT /api/v1/comments/{id}
pub async fn update_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CommentInput>,
) -> AppResult<Json<DataResponse<Comment>>> {
    require_text("content", &input.content)?;
    let comment = CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Comment", id))?;
    if comment.author_id != auth.user_id {
        return Err(AppError::forbidden("You can only edit your own comments."));
    }

    let comment = CommentRepo::update(&state.pool, id, &input.content)
        .await?
        .ok_or(AppError::not_found("Comment", id))?;
    Ok(Json(DataResponse { data: comment }))
}

/// DELETE /api/v1/comments/{id}
///
/// Authors may delete their own comments; admins may delete any.
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let comment = CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Comment", id))?;
    if !auth.can_access(comment.author_id) {
        return Err(AppError::forbidden(
            "You do not have permission to delete this comment.",
        ));
    }

    CommentRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Name shown in notifications about the caller's actions.
async fn actor_name(state: &AppState, user_id: DbId) -> AppResult<String> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::not_found("User", user_id))?;
    Ok(user.display_name())
}
