//! Repository for the `event_speakers` table.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateSpeaker, EventSpeaker};

const COLUMNS: &str =
    "id, event_id, name, title, bio, photo_url, sort_order, created_at, updated_at";

pub struct SpeakerRepo;

impl SpeakerRepo {
    pub async fn create(
        pool: &PgPool,
        event_id: DbId,
        input: &CreateSpeaker,
    ) -> Result<EventSpeaker, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_speakers (event_id, name, title, bio, photo_url, sort_order)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5, COALESCE($6, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventSpeaker>(&query)
            .bind(event_id)
            .bind(&input.name)
            .bind(&input.title)
            .bind(&input.bio)
            .bind(&input.photo_url)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Speakers of an event in display order.
    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<EventSpeaker>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_speakers WHERE event_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, EventSpeaker>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }
}
