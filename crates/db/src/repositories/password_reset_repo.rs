//! Repository for the `password_reset_tokens` table.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::password_reset::PasswordResetToken;

const COLUMNS: &str = "id, user_id, token, is_used, created_at, updated_at";

/// Issues and consumes 6-digit password-reset codes.
pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Store a freshly generated code for a user.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        token: &str,
    ) -> Result<PasswordResetToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO password_reset_tokens (user_id, token)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(user_id)
            .bind(token)
            .fetch_one(pool)
            .await
    }

    /// The most recent unused row matching this user and code.
    pub async fn find_latest_unused(
        pool: &PgPool,
        user_id: DbId,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM password_reset_tokens
             WHERE user_id = $1 AND token = $2 AND is_used = false
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(user_id)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Mark a code as consumed. Returns `false` if it was already used.
    pub async fn mark_used(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE password_reset_tokens SET is_used = true WHERE id = $1 AND is_used = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
