//! Payment fields shared by enrollments and registrations.

use academy_core::payments::DEFAULT_CURRENCY;

/// Payment fields stamped on an enrollment or registration at activation.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentStamp {
    pub paid: bool,
    pub amount_cents: Option<i64>,
    pub currency: String,
    pub reference: Option<String>,
}

impl PaymentStamp {
    /// A paid stamp for `amount_cents` in `currency`.
    pub fn paid(
        amount_cents: i64,
        currency: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            paid: true,
            amount_cents: Some(amount_cents),
            currency: currency.into(),
            reference: Some(reference.into()),
        }
    }

    /// No payment taken (free enrollment outside the purchase flow).
    pub fn unpaid() -> Self {
        Self {
            paid: false,
            amount_cents: None,
            currency: DEFAULT_CURRENCY.to_string(),
            reference: None,
        }
    }
}
