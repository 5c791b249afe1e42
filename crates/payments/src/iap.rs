//! In-app purchase transactions.
//!
//! Mobile purchases are validated with the store by a receipt-validation
//! relay before the app submits the transaction id, so the backend only
//! recognizes the reference shape and records it.

use academy_core::payments::{classify_reference, PaymentSource};

/// Outcome of validating an in-app transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IapValidation {
    pub valid: bool,
    pub transaction_id: String,
}

pub struct IapValidator;

impl IapValidator {
    /// Whether a payment reference is an in-app transaction id rather than
    /// a card PaymentIntent or the free sentinel.
    pub fn is_iap_transaction(reference: &str) -> bool {
        classify_reference(reference) == PaymentSource::InApp
    }

    /// Accept a relay-validated transaction id.
    ///
    /// Card intents and the free sentinel are never valid here.
    pub fn validate(transaction_id: &str) -> IapValidation {
        let valid =
            !transaction_id.trim().is_empty() && Self::is_iap_transaction(transaction_id);
        tracing::debug!(transaction_id, valid, "Checked relay-validated IAP transaction");
        IapValidation {
            valid,
            transaction_id: transaction_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_transaction_is_iap() {
        assert!(IapValidator::is_iap_transaction("1000000912345678"));
        assert!(!IapValidator::is_iap_transaction("pi_abc"));
        assert!(!IapValidator::is_iap_transaction("free"));
    }

    #[test]
    fn validate_trusts_relay() {
        let v = IapValidator::validate("rc_txn_1");
        assert!(v.valid);
        assert_eq!(v.transaction_id, "rc_txn_1");
    }

    #[test]
    fn validate_rejects_other_reference_kinds() {
        assert!(!IapValidator::validate("pi_abc").valid);
        assert!(!IapValidator::validate("free").valid);
        assert!(!IapValidator::validate("   ").valid);
    }
}
