//! Password-reset code rows.

use academy_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `password_reset_tokens` table.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub is_used: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
