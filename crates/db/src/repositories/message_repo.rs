//! Repository for `messages` and `message_read_statuses`.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::chat::{CreateMessage, Message, MessageWithSender};

const COLUMNS: &str = "id, chat_room_id, sender_id, content, image_url, file_url, is_read, \
                        read_at, created_at, updated_at";

const WITH_SENDER: &str = "SELECT m.id, m.chat_room_id, m.sender_id, m.content, m.image_url, \
                            m.file_url, m.is_read, m.read_at, m.created_at, m.updated_at, \
                            u.username AS sender_username, u.first_name AS sender_first_name, \
                            u.last_name AS sender_last_name, u.avatar_url AS sender_avatar_url \
                            FROM messages m JOIN users u ON u.id = m.sender_id";

pub struct MessageRepo;

impl MessageRepo {
    /// Insert a message from `sender_id` into a room.
    pub async fn create(
        pool: &PgPool,
        room_id: DbId,
        sender_id: DbId,
        input: &CreateMessage,
    ) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (chat_room_id, sender_id, content, image_url, file_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(room_id)
            .bind(sender_id)
            .bind(&input.content)
            .bind(&input.image_url)
            .bind(&input.file_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Message>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE id = $1");
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_sender(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MessageWithSender>, sqlx::Error> {
        let query = format!("{WITH_SENDER} WHERE m.id = $1");
        sqlx::query_as::<_, MessageWithSender>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All messages of a room, oldest first.
    pub async fn list_for_room(
        pool: &PgPool,
        room_id: DbId,
    ) -> Result<Vec<MessageWithSender>, sqlx::Error> {
        let query = format!("{WITH_SENDER} WHERE m.chat_room_id = $1 ORDER BY m.created_at, m.id");
        sqlx::query_as::<_, MessageWithSender>(&query)
            .bind(room_id)
            .fetch_all(pool)
            .await
    }

    /// Mark every unread message from other senders in the room as read by
    /// `user_id`, recording a read status for each. Returns how many were marked.
    pub async fn mark_room_read(
        pool: &PgPool,
        room_id: DbId,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "WITH marked AS (
                UPDATE messages SET is_read = true, read_at = NOW()
                WHERE chat_room_id = $1 AND is_read = false AND sender_id <> $2
                RETURNING id
             ), statuses AS (
                INSERT INTO message_read_statuses (message_id, user_id)
                SELECT id, $2 FROM marked
                ON CONFLICT ON CONSTRAINT uq_message_read_statuses_message_user DO NOTHING
             )
             SELECT COUNT(*) FROM marked",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Mark one message read by `user_id`. Already-read messages are left as is.
    ///
    /// Returns `true` when this call flipped the message to read.
    pub async fn mark_read(
        pool: &PgPool,
        message_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE messages SET is_read = true, read_at = NOW()
             WHERE id = $1 AND is_read = false",
        )
        .bind(message_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO message_read_statuses (message_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_message_read_statuses_message_user DO NOTHING",
        )
        .bind(message_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
