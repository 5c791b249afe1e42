//! The card-processor seam.
//!
//! Handlers depend on `dyn PaymentProcessor` so tests can swap Stripe for a
//! deterministic fake.

use academy_core::payments::{is_intent_id, normalize_currency};
use async_trait::async_trait;

use crate::client::{IntentRequest, PaymentIntent, StripeClient, StripeError};

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_intent(&self, request: &IntentRequest) -> Result<PaymentIntent, StripeError>;

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, StripeError>;
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_intent(&self, request: &IntentRequest) -> Result<PaymentIntent, StripeError> {
        self.create_payment_intent(request).await
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        self.retrieve_payment_intent(id).await
    }
}

/// A card payment confirmed by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub amount_cents: i64,
    /// Upper-case ISO code.
    pub currency: String,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Payment not completed.")]
    NotCompleted { status: String },

    #[error("Payment verification failed: malformed payment intent ID")]
    MalformedId,

    #[error("Payment verification failed: processor returned intent {returned}")]
    IdMismatch { returned: String },

    #[error("Payment verification failed: {0}")]
    Failed(#[from] StripeError),
}

impl VerifyError {
    /// Message safe to show the client. Processor response bodies stay in
    /// the logs.
    pub fn client_message(&self) -> String {
        match self {
            VerifyError::Failed(StripeError::ApiError { status, .. }) => {
                format!("Payment verification failed: processor returned status {status}")
            }
            VerifyError::Failed(_) => "Payment verification failed: processor unavailable".into(),
            VerifyError::IdMismatch { .. } => {
                "Payment verification failed: payment intent mismatch".into()
            }
            other => other.to_string(),
        }
    }
}

/// Re-fetch a PaymentIntent and require the `succeeded` status.
///
/// The id must look like a PaymentIntent id, and the processor must answer
/// with that same intent.
pub async fn verify_succeeded(
    processor: &dyn PaymentProcessor,
    intent_id: &str,
) -> Result<VerifiedPayment, VerifyError> {
    if !is_intent_id(intent_id) {
        return Err(VerifyError::MalformedId);
    }
    let intent = processor.retrieve_intent(intent_id).await?;
    if intent.id != intent_id {
        return Err(VerifyError::IdMismatch { returned: intent.id });
    }
    if !intent.is_succeeded() {
        tracing::info!(
            payment_reference = intent_id,
            status = %intent.status,
            "Payment intent not succeeded"
        );
        return Err(VerifyError::NotCompleted {
            status: intent.status,
        });
    }
    Ok(VerifiedPayment {
        amount_cents: intent.amount,
        currency: normalize_currency(&intent.currency),
    })
}
