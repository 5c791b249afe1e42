//! Academy domain primitives.
//!
//! This crate has no I/O. It holds the shared id/timestamp types, the
//! domain error, role and notification constants, and the pure pieces of
//! the purchase flow (payment reference classification, QR ticket
//! rendering, progress arithmetic) so the database, API and delivery
//! crates can all depend on it.

pub mod error;
pub mod notification_types;
pub mod payments;
pub mod progress;
pub mod qr;
pub mod roles;
pub mod signature;
pub mod types;
pub mod validation;
