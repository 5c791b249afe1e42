//! Repository for the `event_registrations` table.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{EventRegistration, RegistrationActivation, RegistrationDetail};
use crate::models::payment::PaymentStamp;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, event_id, attendee_id, is_cancelled, attended, notes, registered_at, \
                        paid, amount_paid_cents, currency, payment_reference, qr_code, \
                        created_at, updated_at";

/// Provides registration lifecycle operations.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Find a registration by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EventRegistration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM event_registrations WHERE id = $1");
        sqlx::query_as::<_, EventRegistration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The attendee's non-cancelled registration for an event, if any.
    pub async fn find_active(
        pool: &PgPool,
        attendee_id: DbId,
        event_id: DbId,
    ) -> Result<Option<EventRegistration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_registrations
             WHERE attendee_id = $1 AND event_id = $2 AND is_cancelled = false"
        );
        sqlx::query_as::<_, EventRegistration>(&query)
            .bind(attendee_id)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of non-cancelled registrations for an event.
    pub async fn count_active(pool: &PgPool, event_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1 AND is_cancelled = false",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a new registration or reinstate a cancelled one.
    ///
    /// Returns `None` when a non-cancelled row already exists.
    pub async fn activate(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        attendee_id: DbId,
        event_id: DbId,
        notes: Option<&str>,
        stamp: &PaymentStamp,
    ) -> Result<Option<RegistrationActivation>, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_registrations (attendee_id, event_id, notes, paid,
                                              amount_paid_cents, currency, payment_reference)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT ON CONSTRAINT uq_event_registrations_event_attendee DO UPDATE SET
                is_cancelled = false,
                notes = COALESCE(EXCLUDED.notes, event_registrations.notes),
                paid = EXCLUDED.paid,
                amount_paid_cents = EXCLUDED.amount_paid_cents,
                currency = EXCLUDED.currency,
                payment_reference = EXCLUDED.payment_reference,
                qr_code = NULL
             WHERE event_registrations.is_cancelled = true
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        sqlx::query_as::<_, RegistrationActivation>(&query)
            .bind(attendee_id)
            .bind(event_id)
            .bind(notes)
            .bind(stamp.paid)
            .bind(stamp.amount_cents)
            .bind(&stamp.currency)
            .bind(&stamp.reference)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Store the base64 QR ticket on a registration.
    pub async fn set_qr_code(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        qr_code: &str,
    ) -> Result<EventRegistration, sqlx::Error> {
        let query = format!(
            "UPDATE event_registrations SET qr_code = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventRegistration>(&query)
            .bind(id)
            .bind(qr_code)
            .fetch_one(&mut **tx)
            .await
    }

    /// Cancel the attendee's active registration. Returns `false` when none exists.
    pub async fn cancel(
        pool: &PgPool,
        attendee_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE event_registrations SET is_cancelled = true
             WHERE attendee_id = $1 AND event_id = $2 AND is_cancelled = false",
        )
        .bind(attendee_id)
        .bind(event_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A registration with its attendee and event, for ticket display and scanning.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RegistrationDetail>, sqlx::Error> {
        sqlx::query_as::<_, RegistrationDetail>(
            "SELECT r.id, r.event_id, r.attendee_id, r.is_cancelled, r.attended, r.notes,
                    r.registered_at, r.paid, r.amount_paid_cents, r.currency,
                    r.payment_reference, r.qr_code, r.created_at, r.updated_at,
                    u.username AS attendee_username, u.email AS attendee_email,
                    u.first_name AS attendee_first_name, u.last_name AS attendee_last_name,
                    e.title AS event_title, e.start_date AS event_start_date,
                    e.end_date AS event_end_date, e.venue AS event_venue,
                    e.is_in_person AS event_is_in_person
             FROM event_registrations r
             JOIN users u ON u.id = r.attendee_id
             JOIN events e ON e.id = r.event_id
             WHERE r.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
