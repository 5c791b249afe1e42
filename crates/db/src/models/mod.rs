//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` entity structs matching database rows (plus joined read models)
//! - `Deserialize` create DTOs for inserts
//! - `Deserialize` update DTOs (all `Option` fields) for patches

pub mod chat;
pub mod course;
pub mod event;
pub mod notification;
pub mod password_reset;
pub mod payment;
pub mod session;
pub mod timeline;
pub mod user;
