//! QR ticket payloads for in-person courses and events.
//!
//! The payload is serialized to JSON, encoded as a QR symbol, rendered to a
//! greyscale PNG (10 px modules with the standard 4-module quiet zone) and
//! stored as standard base64 so clients can embed it in a data URI.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Pixel size of one QR module.
pub const MODULE_PX: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("QR payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("QR image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Ticket payload for an in-person course enrollment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrollmentTicket {
    pub enrollment_id: DbId,
    pub course_id: DbId,
    pub student_id: DbId,
    pub name: String,
    pub course_title: String,
}

/// Ticket payload for an in-person event registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrationTicket {
    pub registration_id: DbId,
    pub event_id: DbId,
    pub attendee_id: DbId,
    pub name: String,
    pub event_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

impl RegistrationTicket {
    /// Build a ticket, formatting the optional start time as RFC 3339.
    pub fn new(
        registration_id: DbId,
        event_id: DbId,
        attendee_id: DbId,
        name: impl Into<String>,
        event_title: impl Into<String>,
        start_date: Option<Timestamp>,
    ) -> Self {
        Self {
            registration_id,
            event_id,
            attendee_id,
            name: name.into(),
            event_title: event_title.into(),
            start_date: start_date.map(|d| d.to_rfc3339()),
        }
    }
}

/// Serialize `payload` and render it as a base64-encoded PNG QR code.
pub fn render_base64_png<T: Serialize>(payload: &T) -> Result<String, QrError> {
    let text = serde_json::to_string(payload)?;
    let code = QrCode::new(text.as_bytes())?;
    let img = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PX, MODULE_PX)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn ticket() -> EnrollmentTicket {
        EnrollmentTicket {
            enrollment_id: 7,
            course_id: 3,
            student_id: 11,
            name: "Ada Lovelace".into(),
            course_title: "Clinical Pharmacology".into(),
        }
    }

    #[test]
    fn renders_a_decodable_png() {
        let b64 = render_base64_png(&ticket()).expect("render should succeed");
        let bytes = STANDARD.decode(b64).expect("output must be valid base64");
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);

        let img = image::load_from_memory(&bytes).expect("PNG must decode");
        assert!(img.width() > 0);
        assert_eq!(img.width(), img.height(), "QR images are square");
        assert_eq!(img.width() % MODULE_PX, 0);
    }

    #[test]
    fn registration_ticket_formats_start_date() {
        let start = chrono::DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let t = RegistrationTicket::new(1, 2, 3, "Grace", "Congress", Some(start));
        assert_eq!(t.start_date.as_deref(), Some("2026-03-01T09:00:00+00:00"));
    }

    #[test]
    fn registration_ticket_omits_missing_start_date() {
        let t = RegistrationTicket::new(1, 2, 3, "Grace", "Congress", None);
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("start_date").is_none());
        assert_eq!(json["event_title"], "Congress");
    }
}
