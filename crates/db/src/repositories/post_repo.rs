//! Repositories for the timeline: `posts`, `comments` and `likes`.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::timeline::{
    Comment, CommentWithAuthor, CreatePost, Like, Post, PostDetail, UpdatePost,
};

const POST_COLUMNS: &str = "id, author_id, content, image_url, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, post_id, author_id, content, created_at, updated_at";
const LIKE_COLUMNS: &str = "id, post_id, user_id, created_at, updated_at";

/// Provides CRUD operations for posts.
pub struct PostRepo;

impl PostRepo {
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        input: &CreatePost,
    ) -> Result<Post, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (author_id, content, image_url)
             VALUES ($1, $2, $3)
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(author_id)
            .bind(&input.content)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A post with author card and counters; `is_liked` is relative to `viewer_id`.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
        viewer_id: Option<DbId>,
    ) -> Result<Option<PostDetail>, sqlx::Error> {
        sqlx::query_as::<_, PostDetail>(
            "SELECT p.id, p.author_id, p.content, p.image_url, p.created_at, p.updated_at,
                    u.username AS author_username, u.first_name AS author_first_name,
                    u.last_name AS author_last_name, u.avatar_url AS author_avatar_url,
                    (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count,
                    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
                    EXISTS(SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = $2)
                        AS is_liked
             FROM posts p
             JOIN users u ON u.id = p.author_id
             WHERE p.id = $1",
        )
        .bind(id)
        .bind(viewer_id)
        .fetch_optional(pool)
        .await
    }

    /// Update a post. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePost,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET
                content = COALESCE($2, content),
                image_url = COALESCE($3, image_url)
             WHERE id = $1
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(&input.content)
            .bind(&input.image_url)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(
        pool: &PgPool,
        post_id: DbId,
        author_id: DbId,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (post_id, author_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .bind(author_id)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Comments on a post with author cards, oldest first.
    pub async fn list_for_post(
        pool: &PgPool,
        post_id: DbId,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(
            "SELECT c.id, c.post_id, c.author_id, c.content, c.created_at, c.updated_at,
                    u.username AS author_username, u.first_name AS author_first_name,
                    u.last_name AS author_last_name, u.avatar_url AS author_avatar_url
             FROM comments c
             JOIN users u ON u.id = c.author_id
             WHERE c.post_id = $1
             ORDER BY c.created_at, c.id",
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query =
            format!("UPDATE comments SET content = $2 WHERE id = $1 RETURNING {COMMENT_COLUMNS}");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides like/unlike operations.
pub struct LikeRepo;

impl LikeRepo {
    /// Plain insert. A second like by the same user violates `uq_likes_post_user`.
    pub async fn create(pool: &PgPool, post_id: DbId, user_id: DbId) -> Result<Like, sqlx::Error> {
        let query = format!(
            "INSERT INTO likes (post_id, user_id) VALUES ($1, $2) RETURNING {LIKE_COLUMNS}"
        );
        sqlx::query_as::<_, Like>(&query)
            .bind(post_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Like a post unless already liked. Returns `None` when the like existed.
    pub async fn create_if_absent(
        pool: &PgPool,
        post_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Like>, sqlx::Error> {
        let query = format!(
            "INSERT INTO likes (post_id, user_id) VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_likes_post_user DO NOTHING
             RETURNING {LIKE_COLUMNS}"
        );
        sqlx::query_as::<_, Like>(&query)
            .bind(post_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove a like. Returns `false` when the user had not liked the post.
    pub async fn delete(pool: &PgPool, post_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_for_post(pool: &PgPool, post_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(pool)
            .await
    }
}
