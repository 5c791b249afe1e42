use std::sync::Arc;

use academy_events::{Branding, EmailDelivery, Notifier};
use academy_payments::PaymentProcessor;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: academy_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// SMTP delivery; `None` when `SMTP_HOST` is unset.
    pub email: Option<Arc<EmailDelivery>>,
    /// In-app notification writer.
    pub notifier: Notifier,
    /// Card processor; `None` when Stripe is not configured.
    pub processor: Option<Arc<dyn PaymentProcessor>>,
    /// Handed to clients alongside a PaymentIntent client secret.
    pub stripe_publishable_key: Option<String>,
    /// Webhook signing secret; deliveries are unverified without it.
    pub stripe_webhook_secret: Option<String>,
    /// Product name and links used in email bodies.
    pub branding: Branding,
}

impl AppState {
    pub fn email(&self) -> Option<&EmailDelivery> {
        self.email.as_deref()
    }
}
