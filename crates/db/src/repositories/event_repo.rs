//! Repository for the `events` table.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event, UpdateEvent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, short_description, event_type, image_url, \
                        organizer_id, start_date, end_date, is_online, is_in_person, venue, \
                        address, city, country, meeting_url, price_cents, currency, \
                        max_attendees, registration_deadline, is_published, is_featured, \
                        created_at, updated_at";

/// Provides CRUD operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event organized by `organizer_id`.
    pub async fn create(
        pool: &PgPool,
        organizer_id: DbId,
        input: &CreateEvent,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (title, description, short_description, event_type, image_url,
                                 organizer_id, start_date, end_date, is_online, is_in_person,
                                 venue, address, city, country, meeting_url, price_cents,
                                 currency, max_attendees, registration_deadline, is_published,
                                 is_featured)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, 'seminar'), $5,
                     $6, $7, $8, COALESCE($9, true), COALESCE($10, false),
                     $11, $12, $13, $14, $15, COALESCE($16, 0),
                     COALESCE($17, 'EUR'), COALESCE($18, 0), $19, COALESCE($20, false),
                     COALESCE($21, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.short_description)
            .bind(&input.event_type)
            .bind(&input.image_url)
            .bind(organizer_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.is_online)
            .bind(input.is_in_person)
            .bind(&input.venue)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.country)
            .bind(&input.meeting_url)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(input.max_attendees)
            .bind(input.registration_deadline)
            .bind(input.is_published)
            .bind(input.is_featured)
            .fetch_one(pool)
            .await
    }

    /// Find an event by ID regardless of publication state.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a published event by ID.
    pub async fn find_published(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1 AND is_published = true");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update an event. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                short_description = COALESCE($4, short_description),
                event_type = COALESCE($5, event_type),
                image_url = COALESCE($6, image_url),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                is_online = COALESCE($9, is_online),
                is_in_person = COALESCE($10, is_in_person),
                venue = COALESCE($11, venue),
                address = COALESCE($12, address),
                city = COALESCE($13, city),
                country = COALESCE($14, country),
                meeting_url = COALESCE($15, meeting_url),
                price_cents = COALESCE($16, price_cents),
                currency = COALESCE($17, currency),
                max_attendees = COALESCE($18, max_attendees),
                registration_deadline = COALESCE($19, registration_deadline),
                is_published = COALESCE($20, is_published),
                is_featured = COALESCE($21, is_featured)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.short_description)
            .bind(&input.event_type)
            .bind(&input.image_url)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.is_online)
            .bind(input.is_in_person)
            .bind(&input.venue)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.country)
            .bind(&input.meeting_url)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(input.max_attendees)
            .bind(input.registration_deadline)
            .bind(input.is_published)
            .bind(input.is_featured)
            .fetch_optional(pool)
            .await
    }

    /// Delete an event; speakers and registrations cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
