//! Repository for `chat_rooms` and `chat_room_participants`.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::chat::{ChatRoom, ChatRoomOverview, RoomParticipant};

const COLUMNS: &str = "id, title, is_group, created_at, updated_at";

/// Provides room membership and listing operations.
pub struct ChatRepo;

impl ChatRepo {
    /// Create a room and add every existing user among `participant_ids`.
    ///
    /// Unknown user ids are skipped. Runs in one transaction.
    pub async fn create_room(
        pool: &PgPool,
        title: Option<&str>,
        is_group: bool,
        participant_ids: &[DbId],
    ) -> Result<ChatRoom, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO chat_rooms (title, is_group) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let room = sqlx::query_as::<_, ChatRoom>(&query)
            .bind(title)
            .bind(is_group)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO chat_room_participants (chat_room_id, user_id)
             SELECT $1, u.id FROM users u WHERE u.id = ANY($2)
             ON CONFLICT ON CONSTRAINT uq_chat_room_participants_room_user DO NOTHING",
        )
        .bind(room.id)
        .bind(participant_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(room)
    }

    /// Find a room by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ChatRoom>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM chat_rooms WHERE id = $1");
        sqlx::query_as::<_, ChatRoom>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `user_id` participates in the room.
    pub async fn is_participant(
        pool: &PgPool,
        room_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM chat_room_participants WHERE chat_room_id = $1 AND user_id = $2
             )",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// The oldest non-group room shared by both users, if any.
    pub async fn find_direct_room(
        pool: &PgPool,
        user_a: DbId,
        user_b: DbId,
    ) -> Result<Option<ChatRoom>, sqlx::Error> {
        sqlx::query_as::<_, ChatRoom>(
            "SELECT r.id, r.title, r.is_group, r.created_at, r.updated_at
             FROM chat_rooms r
             JOIN chat_room_participants pa ON pa.chat_room_id = r.id AND pa.user_id = $1
             JOIN chat_room_participants pb ON pb.chat_room_id = r.id AND pb.user_id = $2
             WHERE r.is_group = false
             ORDER BY r.created_at, r.id
             LIMIT 1",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(pool)
        .await
    }

    /// Rooms the user participates in, most recently active first, with the
    /// last message and the count of unread messages sent by others.
    pub async fn list_overviews_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ChatRoomOverview>, sqlx::Error> {
        sqlx::query_as::<_, ChatRoomOverview>(
            "SELECT r.id, r.title, r.is_group, r.created_at, r.updated_at,
                    (SELECT COUNT(*) FROM messages m
                      WHERE m.chat_room_id = r.id AND m.is_read = false
                        AND m.sender_id <> $1) AS unread_count,
                    lm.id AS last_message_id,
                    lm.sender_id AS last_message_sender_id,
                    lm.content AS last_message_content,
                    lm.created_at AS last_message_at
             FROM chat_rooms r
             JOIN chat_room_participants p ON p.chat_room_id = r.id AND p.user_id = $1
             LEFT JOIN LATERAL (
                SELECT id, sender_id, content, created_at FROM messages
                WHERE chat_room_id = r.id
                ORDER BY created_at DESC, id DESC
                LIMIT 1
             ) lm ON true
             ORDER BY r.updated_at DESC, r.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Participants of all the given rooms, batch-loaded.
    pub async fn participants_for_rooms(
        pool: &PgPool,
        room_ids: &[DbId],
    ) -> Result<Vec<RoomParticipant>, sqlx::Error> {
        sqlx::query_as::<_, RoomParticipant>(
            "SELECT p.chat_room_id, u.id, u.username, u.first_name, u.last_name, u.avatar_url
             FROM chat_room_participants p
             JOIN users u ON u.id = p.user_id
             WHERE p.chat_room_id = ANY($1)
             ORDER BY p.chat_room_id, u.id",
        )
        .bind(room_ids)
        .fetch_all(pool)
        .await
    }

    /// Bump the room's activity timestamp.
    pub async fn touch(pool: &PgPool, room_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chat_rooms SET updated_at = NOW() WHERE id = $1")
            .bind(room_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
