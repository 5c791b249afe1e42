//! Post, comment and like models.

use academy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A post with its author and engagement counters for one viewer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_avatar_url: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
}

/// DTO for creating a post.
#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub content: String,
    pub image_url: Option<String>,
}

/// DTO for updating a post. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdatePost {
    pub content: Option<String>,
    pub image_url: Option<String>,
}

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub post_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A comment joined with its author's public card.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_avatar_url: Option<String>,
}

/// DTO for creating or editing a comment.
#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub content: String,
}

/// A row from the `likes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Like {
    pub id: DbId,
    pub post_id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
