//! Stripe webhook parsing.
//!
//! Only two event types finalize a purchase: `payment_intent.succeeded`
//! and `checkout.session.completed`. Both carry the purchase in the
//! object's `metadata` (`type`, `user_id`, `course_id` or `event_id`).

use std::collections::HashMap;

use academy_core::payments::{normalize_currency, ItemKind};
use academy_core::signature::{self, SignatureError};
use academy_core::types::DbId;
use serde::Deserialize;

pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),

    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A successful payment reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotice {
    pub kind: ItemKind,
    pub user_id: DbId,
    pub item_id: DbId,
    /// Minor units; zero when the processor reported no amount.
    pub amount_cents: i64,
    /// Upper-case ISO code.
    pub currency: String,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Payment(PaymentNotice),
    /// Acknowledged without action: unhandled type or unusable metadata.
    Ignored { event_type: String },
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawData,
}

#[derive(Deserialize)]
struct RawData {
    object: RawObject,
}

#[derive(Deserialize)]
struct RawObject {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

/// Verify (when a secret is configured) and parse a webhook delivery.
///
/// `now` is the current unix time in seconds.
pub fn parse_event(
    payload: &[u8],
    signature_header: Option<&str>,
    secret: Option<&str>,
    now: i64,
) -> Result<WebhookEvent, WebhookError> {
    if let Some(secret) = secret {
        let header = signature_header.ok_or(SignatureError::Malformed)?;
        signature::verify_header(
            secret,
            header,
            payload,
            now,
            signature::DEFAULT_TOLERANCE_SECS,
        )?;
    }

    let raw: RawEvent = serde_json::from_slice(payload)?;
    let object = raw.data.object;
    let (amount, reference) = match raw.event_type.as_str() {
        PAYMENT_INTENT_SUCCEEDED => (object.amount, object.id.clone()),
        CHECKOUT_SESSION_COMPLETED => (
            object.amount_total,
            object.id.clone().or_else(|| object.payment_intent.clone()),
        ),
        _ => {
            return Ok(WebhookEvent::Ignored {
                event_type: raw.event_type,
            })
        }
    };

    match notice_from_metadata(object.metadata.as_ref(), amount, object.currency, reference) {
        Some(notice) => Ok(WebhookEvent::Payment(notice)),
        None => {
            tracing::info!(
                event_type = %raw.event_type,
                "Webhook metadata missing or invalid, ignoring"
            );
            Ok(WebhookEvent::Ignored {
                event_type: raw.event_type,
            })
        }
    }
}

fn notice_from_metadata(
    metadata: Option<&HashMap<String, String>>,
    amount: Option<i64>,
    currency: Option<String>,
    reference: Option<String>,
) -> Option<PaymentNotice> {
    let metadata = metadata?;
    let kind = ItemKind::parse(metadata.get("type")?)?;
    let user_id = metadata.get("user_id")?.parse().ok()?;
    let item_id = metadata
        .get(&format!("{}_id", kind.as_str()))?
        .parse()
        .ok()?;
    Some(PaymentNotice {
        kind,
        user_id,
        item_id,
        amount_cents: amount.unwrap_or(0),
        currency: normalize_currency(currency.as_deref().unwrap_or("eur")),
        reference,
    })
}
