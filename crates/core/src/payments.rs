//! Payment reference classification and money helpers.
//!
//! Clients confirm a purchase by submitting a single opaque reference. The
//! literal `free` marks a zero-price checkout, Stripe PaymentIntent ids
//! carry the `pi_` prefix, and everything else is an in-app-purchase
//! transaction id that the mobile receipt relay has already validated.

use serde::{Deserialize, Serialize};

/// Sentinel reference for free items.
pub const FREE_REFERENCE: &str = "free";

/// Prefix of Stripe PaymentIntent identifiers.
pub const STRIPE_INTENT_PREFIX: &str = "pi_";

/// Currency stamped on free and in-app purchases.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Where a payment reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentSource {
    /// The `free` sentinel; no verification.
    Free,
    /// A card payment that must be re-verified with Stripe.
    Card,
    /// A pre-validated in-app purchase transaction.
    InApp,
}

/// Classify a (non-empty) payment reference by its shape.
pub fn classify_reference(reference: &str) -> PaymentSource {
    if reference == FREE_REFERENCE {
        PaymentSource::Free
    } else if reference.starts_with(STRIPE_INTENT_PREFIX) {
        PaymentSource::Card
    } else {
        PaymentSource::InApp
    }
}

/// Whether `reference` has the shape of a PaymentIntent id: the `pi_`
/// prefix followed only by ASCII letters, digits and underscores.
/// Only ids of this shape may be sent to the processor API.
pub fn is_intent_id(reference: &str) -> bool {
    reference
        .strip_prefix(STRIPE_INTENT_PREFIX)
        .is_some_and(|rest| {
            !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        })
}

/// The two purchasable item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Course,
    Event,
}

impl ItemKind {
    /// Value used in processor metadata (`type`) and notification links.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Course => "course",
            ItemKind::Event => "event",
        }
    }

    /// Parse the processor metadata `type` field.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "course" => Some(ItemKind::Course),
            "event" => Some(ItemKind::Event),
            _ => None,
        }
    }

    /// Human label used in PaymentIntent descriptions.
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Course => "Course",
            ItemKind::Event => "Event",
        }
    }
}

/// Render minor units as a two-decimal amount, e.g. `1250` -> `"12.50"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Upper-case a processor currency code (`eur` -> `EUR`).
pub fn normalize_currency(currency: &str) -> String {
    currency.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_sentinel_is_free() {
        assert_eq!(classify_reference("free"), PaymentSource::Free);
    }

    #[test]
    fn free_is_case_sensitive() {
        assert_eq!(classify_reference("FREE"), PaymentSource::InApp);
    }

    #[test]
    fn stripe_intent_is_card() {
        assert_eq!(classify_reference("pi_3Nabc123"), PaymentSource::Card);
    }

    #[test]
    fn intent_id_shape() {
        assert!(is_intent_id("pi_3Nabc123"));
        assert!(is_intent_id("pi_ok_4900"));
        assert!(!is_intent_id("pi_"));
        assert!(!is_intent_id("pi_x/../../charges/ch_1"));
        assert!(!is_intent_id("pi_abc?expand[]=customer"));
        assert!(!is_intent_id("pi_abc%2F"));
        assert!(!is_intent_id("ch_123"));
    }

    #[test]
    fn anything_else_is_in_app() {
        assert_eq!(classify_reference("1000000912345678"), PaymentSource::InApp);
        assert_eq!(classify_reference("rc_abc"), PaymentSource::InApp);
        assert_eq!(classify_reference("cs_test_123"), PaymentSource::InApp);
    }

    #[test]
    fn item_kind_round_trips_through_metadata() {
        assert_eq!(ItemKind::parse(ItemKind::Course.as_str()), Some(ItemKind::Course));
        assert_eq!(ItemKind::parse(ItemKind::Event.as_str()), Some(ItemKind::Event));
        assert_eq!(ItemKind::parse("subscription"), None);
    }

    #[test]
    fn format_cents_pads_minor_units() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(-199), "-1.99");
    }

    #[test]
    fn normalize_currency_uppercases() {
        assert_eq!(normalize_currency("eur"), "EUR");
        assert_eq!(normalize_currency(" usd "), "USD");
    }
}
