//! Payment capture: the Stripe REST client, the [`PaymentProcessor`] seam
//! the API layer depends on, webhook parsing and in-app purchase checks.

pub mod client;
pub mod config;
pub mod iap;
pub mod processor;
pub mod webhook;

pub use client::{IntentRequest, PaymentIntent, StripeClient, StripeError};
pub use config::StripeConfig;
pub use iap::IapValidator;
pub use processor::{verify_succeeded, PaymentProcessor, VerifiedPayment, VerifyError};
pub use webhook::{PaymentNotice, WebhookError, WebhookEvent};
