//! Event, speaker and registration models.

use academy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub event_type: String,
    pub image_url: Option<String>,
    pub organizer_id: DbId,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub is_online: bool,
    pub is_in_person: bool,
    pub venue: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub meeting_url: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub max_attendees: i32,
    pub registration_deadline: Option<Timestamp>,
    pub is_published: bool,
    pub is_featured: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    pub fn is_free(&self) -> bool {
        self.price_cents <= 0
    }

    /// A `max_attendees` of 0 means unlimited.
    pub fn is_full(&self, registered_count: i64) -> bool {
        self.max_attendees > 0 && registered_count >= i64::from(self.max_attendees)
    }

    pub fn is_past(&self, now: Timestamp) -> bool {
        self.end_date < now
    }

    pub fn deadline_passed(&self, now: Timestamp) -> bool {
        self.registration_deadline.is_some_and(|d| now > d)
    }
}

/// DTO for creating an event. Omitted fields take the column defaults.
#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub event_type: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub is_online: Option<bool>,
    pub is_in_person: Option<bool>,
    pub venue: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub meeting_url: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub max_attendees: Option<i32>,
    pub registration_deadline: Option<Timestamp>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
}

/// DTO for updating an event. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub event_type: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub is_online: Option<bool>,
    pub is_in_person: Option<bool>,
    pub venue: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub meeting_url: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub max_attendees: Option<i32>,
    pub registration_deadline: Option<Timestamp>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
}

/// A row from the `event_speakers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventSpeaker {
    pub id: DbId,
    pub event_id: DbId,
    pub name: String,
    pub title: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a speaker. The event comes from the URL.
#[derive(Debug, Deserialize)]
pub struct CreateSpeaker {
    pub name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub sort_order: Option<i32>,
}

/// A row from the `event_registrations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventRegistration {
    pub id: DbId,
    pub event_id: DbId,
    pub attendee_id: DbId,
    pub is_cancelled: bool,
    pub attended: bool,
    pub notes: Option<String>,
    pub registered_at: Timestamp,
    pub paid: bool,
    pub amount_paid_cents: Option<i64>,
    pub currency: String,
    pub payment_reference: Option<String>,
    pub qr_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of an insert-or-reactivate upsert on `event_registrations`.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationActivation {
    #[sqlx(flatten)]
    pub registration: EventRegistration,
    pub inserted: bool,
}

/// A registration joined with its attendee and event, for ticket scanning.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RegistrationDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub registration: EventRegistration,
    pub attendee_username: String,
    pub attendee_email: String,
    pub attendee_first_name: String,
    pub attendee_last_name: String,
    pub event_title: String,
    pub event_start_date: Timestamp,
    pub event_end_date: Timestamp,
    pub event_venue: Option<String>,
    pub event_is_in_person: bool,
}
