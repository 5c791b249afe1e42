//! Outbound user-facing messages for the academy backend.
//!
//! - [`delivery`] sends transactional email over SMTP.
//! - [`templates`] builds the plain-text bodies for those emails.
//! - [`Notifier`] writes in-app notifications for domain actions.
//!
//! Both channels are best-effort from the caller's point of view: a failed
//! send is logged and never fails the request that triggered it.

pub mod delivery;
pub mod notifier;
pub mod templates;

pub use delivery::email::{EmailConfig, EmailDelivery, OutgoingEmail};
pub use notifier::Notifier;
pub use templates::Branding;
