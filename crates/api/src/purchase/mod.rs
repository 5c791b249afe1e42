//! Purchase confirmation for courses and events.
//!
//! The synchronous confirm endpoints, the processor webhook and the
//! simulated-payment enroll/register endpoints all funnel into
//! [`activate`], which inserts or reactivates the record, issues the QR
//! ticket and seeds lesson progress inside one transaction.

pub mod item;

use academy_core::error::CoreError;
use academy_core::payments::{classify_reference, PaymentSource, DEFAULT_CURRENCY, FREE_REFERENCE};
use academy_core::qr::{render_base64_png, EnrollmentTicket, RegistrationTicket};
use academy_core::types::DbId;
use academy_db::models::course::Course;
use academy_db::models::event::Event;
use academy_db::models::payment::PaymentStamp;
use academy_db::models::user::User;
use academy_db::repositories::{EnrollmentRepo, LessonRepo, RegistrationRepo, UserRepo};
use academy_events::delivery::email::send_best_effort;
use academy_events::notifier;
use academy_events::templates::{self, PurchaseReceipt};
use academy_payments::{verify_succeeded, IapValidator, PaymentNotice};
use axum::http::StatusCode;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub use item::{PurchasableItem, PurchaseRecord};

/// Result of an activation attempt.
#[derive(Debug)]
pub struct Activation {
    pub record: PurchaseRecord,
    /// `false` when an active record already existed.
    pub created: bool,
}

/// Confirm a client-side payment for `item`.
///
/// Returns 200 with the existing record when the user already holds an
/// active one, otherwise 201 with the newly activated record.
pub async fn confirm(
    state: &AppState,
    user_id: DbId,
    item: &PurchasableItem,
    reference: Option<&str>,
) -> AppResult<(StatusCode, PurchaseRecord)> {
    let reference = reference
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::BadRequest("Payment intent ID required.".into()))?;

    if let Some(existing) = item.find_active(&state.pool, user_id).await? {
        tracing::debug!(
            user_id,
            item_id = item.id(),
            kind = item.kind().as_str(),
            "Purchase already active"
        );
        return Ok((StatusCode::OK, existing));
    }

    let stamp = resolve_payment(state, item, reference).await?;
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::not_found("User", user_id))?;

    let activation = activate(state, &user, item, &stamp, None, item.is_in_person()).await?;
    if !activation.created {
        return Ok((StatusCode::OK, activation.record));
    }

    announce(state, &user, item, &activation.record, &stamp).await;
    Ok((StatusCode::CREATED, activation.record))
}

/// Turn a payment reference into the payment fields to stamp.
async fn resolve_payment(
    state: &AppState,
    item: &PurchasableItem,
    reference: &str,
) -> AppResult<PaymentStamp> {
    match classify_reference(reference) {
        PaymentSource::Free => Ok(PaymentStamp::paid(0, DEFAULT_CURRENCY, FREE_REFERENCE)),
        PaymentSource::Card => {
            let processor = state.processor.as_deref().ok_or_else(|| {
                AppError::BadRequest("Payment verification failed: processor not configured".into())
            })?;
            let verified = verify_succeeded(processor, reference).await.map_err(|e| {
                tracing::warn!(
                    payment_reference = reference,
                    error = %e,
                    "Payment verification failed"
                );
                AppError::BadRequest(e.client_message())
            })?;
            Ok(PaymentStamp::paid(
                verified.amount_cents,
                verified.currency,
                reference,
            ))
        }
        PaymentSource::InApp => {
            let validation = IapValidator::validate(reference);
            if !validation.valid {
                return Err(AppError::BadRequest("Invalid in-app transaction.".into()));
            }
            Ok(PaymentStamp::paid(
                item.price_cents(),
                DEFAULT_CURRENCY,
                validation.transaction_id,
            ))
        }
    }
}

/// Apply a processor webhook notice. Returns whether a record was activated.
pub async fn reconcile_notice(state: &AppState, notice: &PaymentNotice) -> AppResult<bool> {
    let Some(user) = UserRepo::find_by_id(&state.pool, notice.user_id).await? else {
        tracing::info!(user_id = notice.user_id, "Webhook user not found, ignoring");
        return Ok(false);
    };
    let Some(item) = PurchasableItem::load(&state.pool, notice.kind, notice.item_id).await? else {
        tracing::info!(
            item_id = notice.item_id,
            kind = notice.kind.as_str(),
            "Webhook item not found, ignoring"
        );
        return Ok(false);
    };

    if item.find_active(&state.pool, user.id).await?.is_some() {
        tracing::debug!(user_id = user.id, item_id = item.id(), "Webhook for active record");
        return Ok(false);
    }

    let stamp = if notice.amount_cents > 0 {
        PaymentStamp {
            paid: true,
            amount_cents: Some(notice.amount_cents),
            currency: notice.currency.clone(),
            reference: notice.reference.clone(),
        }
    } else {
        PaymentStamp::unpaid()
    };

    let activation = activate(state, &user, &item, &stamp, None, item.is_in_person()).await?;
    if activation.created {
        announce(state, &user, &item, &activation.record, &stamp).await;
    }
    Ok(activation.created)
}

/// Enroll in a course outside the processor flow.
///
/// Paid courses require `simulate_payment`; the simulated payment is
/// stamped with the course price and a generated reference.
pub async fn enroll(
    state: &AppState,
    user: &User,
    course: Course,
    simulate_payment: bool,
) -> AppResult<PurchaseRecord> {
    if EnrollmentRepo::find_active(&state.pool, user.id, course.id)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "You are already enrolled in this course.".into(),
        ));
    }
    let enrolled = EnrollmentRepo::count_active(&state.pool, course.id).await?;
    if course.is_full(enrolled) {
        return Err(AppError::BadRequest("This course is full.".into()));
    }
    if !course.is_free() && !simulate_payment {
        return Err(CoreError::PaymentRequired(
            "Payment required for this course. \
             Include simulate_payment=true in request for testing."
                .into(),
        )
        .into());
    }

    let stamp = simulated_stamp(course.is_free(), course.price_cents);
    let issue_ticket = stamp.paid && course.is_in_person;
    let item = PurchasableItem::Course(course);
    let activation = activate(state, user, &item, &stamp, None, issue_ticket).await?;
    if !activation.created {
        return Err(AppError::BadRequest(
            "You are already enrolled in this course.".into(),
        ));
    }
    Ok(activation.record)
}

/// Register for an event outside the processor flow.
pub async fn register(
    state: &AppState,
    user: &User,
    event: Event,
    notes: Option<&str>,
    simulate_payment: bool,
) -> AppResult<PurchaseRecord> {
    if RegistrationRepo::find_active(&state.pool, user.id, event.id)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "You are already registered for this event.".into(),
        ));
    }
    let registered = RegistrationRepo::count_active(&state.pool, event.id).await?;
    if event.is_full(registered) {
        return Err(AppError::BadRequest("This event is full.".into()));
    }
    let now = chrono::Utc::now();
    if event.is_past(now) {
        return Err(AppError::BadRequest("This event has already ended.".into()));
    }
    if event.deadline_passed(now) {
        return Err(AppError::BadRequest(
            "Registration deadline has passed.".into(),
        ));
    }
    if !event.is_free() && !simulate_payment {
        return Err(CoreError::PaymentRequired(
            "Payment required for this event. Include simulate_payment=true in request for testing."
                .into(),
        )
        .into());
    }

    let stamp = simulated_stamp(event.is_free(), event.price_cents);
    let issue_ticket = stamp.paid && event.is_in_person;
    let item = PurchasableItem::Event(event);
    let activation = activate(state, user, &item, &stamp, notes, issue_ticket).await?;
    if !activation.created {
        return Err(AppError::BadRequest(
            "You are already registered for this event.".into(),
        ));
    }
    Ok(activation.record)
}

fn simulated_stamp(is_free: bool, price_cents: i64) -> PaymentStamp {
    if is_free {
        PaymentStamp::unpaid()
    } else {
        PaymentStamp::paid(
            price_cents,
            DEFAULT_CURRENCY,
            uuid::Uuid::new_v4().to_string(),
        )
    }
}

/// Insert or reactivate the record, attach the ticket and seed progress.
///
/// Everything runs in one transaction. When another activation won the
/// race, the committed record is returned with `created == false`.
pub async fn activate(
    state: &AppState,
    user: &User,
    item: &PurchasableItem,
    stamp: &PaymentStamp,
    notes: Option<&str>,
    issue_ticket: bool,
) -> AppResult<Activation> {
    let mut tx = state.pool.begin().await?;

    let record = match item {
        PurchasableItem::Course(course) => {
            let Some(activation) =
                EnrollmentRepo::activate(&mut tx, user.id, course.id, stamp).await?
            else {
                tx.rollback().await?;
                return already_active(state, user.id, item).await;
            };
            let mut enrollment = activation.enrollment;

            if issue_ticket {
                let ticket = EnrollmentTicket {
                    enrollment_id: enrollment.id,
                    course_id: course.id,
                    student_id: user.id,
                    name: user.full_name(),
                    course_title: course.title.clone(),
                };
                let qr = render_ticket(&ticket)?;
                enrollment = EnrollmentRepo::set_qr_code(&mut tx, enrollment.id, &qr).await?;
            }

            if activation.inserted {
                let rows =
                    EnrollmentRepo::create_progress_rows(&mut tx, enrollment.id, course.id).await?;
                tracing::debug!(enrollment_id = enrollment.id, rows, "Seeded lesson progress");
            }
            PurchaseRecord::Enrollment(enrollment)
        }
        PurchasableItem::Event(event) => {
            let Some(activation) =
                RegistrationRepo::activate(&mut tx, user.id, event.id, notes, stamp).await?
            else {
                tx.rollback().await?;
                return already_active(state, user.id, item).await;
            };
            let mut registration = activation.registration;

            if issue_ticket {
                let ticket = RegistrationTicket::new(
                    registration.id,
                    event.id,
                    user.id,
                    user.full_name(),
                    event.title.clone(),
                    Some(event.start_date),
                );
                let qr = render_ticket(&ticket)?;
                registration = RegistrationRepo::set_qr_code(&mut tx, registration.id, &qr).await?;
            }
            PurchaseRecord::Registration(registration)
        }
    };

    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        item_id = item.id(),
        kind = item.kind().as_str(),
        record_id = record.id(),
        paid = stamp.paid,
        amount_cents = stamp.amount_cents,
        payment_reference = stamp.reference.as_deref(),
        "Purchase activated"
    );
    Ok(Activation {
        record,
        created: true,
    })
}

async fn already_active(
    state: &AppState,
    user_id: DbId,
    item: &PurchasableItem,
) -> AppResult<Activation> {
    match item.find_active(&state.pool, user_id).await? {
        Some(record) => Ok(Activation {
            record,
            created: false,
        }),
        None => Err(CoreError::Conflict(
            "Purchase changed concurrently, please retry.".into(),
        )
        .into()),
    }
}

fn render_ticket<T: serde::Serialize>(ticket: &T) -> AppResult<String> {
    render_base64_png(ticket)
        .map_err(|e| AppError::InternalError(format!("QR rendering failed: {e}")))
}

/// Post-commit side effects. Failures are logged and swallowed.
async fn announce(
    state: &AppState,
    user: &User,
    item: &PurchasableItem,
    record: &PurchaseRecord,
    stamp: &PaymentStamp,
) {
    let confirmation = match item {
        PurchasableItem::Course(c) => notifier::course_enrollment(user.id, c.id, &c.title),
        PurchasableItem::Event(e) => notifier::event_registration(user.id, e.id, &e.title),
    };
    state.notifier.send(confirmation).await;

    let amount_cents = stamp.amount_cents.unwrap_or(0);
    if amount_cents > 0 {
        state
            .notifier
            .send(notifier::payment_success(
                user.id,
                amount_cents,
                &stamp.currency,
                item.kind(),
                item.title(),
            ))
            .await;
    }

    if let (PurchasableItem::Course(course), PurchaseRecord::Enrollment(enrollment)) =
        (item, record)
    {
        let receipt = PurchaseReceipt {
            to: user.email.clone(),
            user_name: user.display_name(),
            course_id: course.id,
            course_title: course.title.clone(),
            course_description: course.description.clone(),
            amount_cents,
            currency: stamp.currency.clone(),
            order_id: enrollment.id,
            payment_reference: stamp.reference.clone().unwrap_or_default(),
            purchased_at: enrollment.enrolled_at,
            lesson_count: lesson_count(state, course.id).await,
            duration_weeks: course.duration_weeks,
            instructor_name: instructor_name(state, course.teacher_id).await,
        };
        let email = templates::purchase_confirmation(&state.branding, &receipt);
        send_best_effort(state.email(), &email).await;
    }
}

pub(crate) async fn lesson_count(state: &AppState, course_id: DbId) -> i64 {
    LessonRepo::count_for_course(&state.pool, course_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(course_id, error = %e, "Failed to count lessons");
            0
        })
}

pub(crate) async fn instructor_name(state: &AppState, teacher_id: DbId) -> Option<String> {
    match UserRepo::find_by_id(&state.pool, teacher_id).await {
        Ok(teacher) => teacher.map(|t| t.display_name()),
        Err(e) => {
            tracing::warn!(teacher_id, error = %e, "Failed to load instructor");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_items_are_not_stamped_as_paid_when_simulated() {
        let stamp = simulated_stamp(true, 0);
        assert!(!stamp.paid);
        assert_eq!(stamp.amount_cents, None);
    }

    #[test]
    fn simulated_payment_uses_price_and_generated_reference() {
        let stamp = simulated_stamp(false, 4900);
        assert!(stamp.paid);
        assert_eq!(stamp.amount_cents, Some(4900));
        assert_eq!(stamp.currency, "EUR");
        let reference = stamp.reference.expect("reference");
        assert!(uuid::Uuid::parse_str(&reference).is_ok());
    }
}
