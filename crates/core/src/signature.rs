//! Webhook HMAC signing and verification.
//!
//! The card processor signs each webhook delivery with a header of the form
//! `t=<unix seconds>,v1=<hex hmac>[,v1=...]`, where the HMAC-SHA256 is
//! computed over `"{t}.{raw body}"` with the endpoint secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age (and clock skew) of a signed delivery.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header is malformed")]
    Malformed,

    #[error("no matching v1 signature")]
    Mismatch,

    #[error("signature timestamp outside tolerance")]
    Expired,
}

/// Compute the hex-encoded signature for `payload` signed at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    hex::encode(mac_for(secret, timestamp, payload).finalize().into_bytes())
}

/// Build a complete signature header, as the processor would send it.
pub fn sign_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={timestamp},v1={}", compute_signature(secret, timestamp, payload))
}

/// Verify a signature header against the raw request body.
///
/// `now` is the current unix time in seconds.
pub fn verify_header(
    secret: &str,
    header: &str,
    payload: &[u8],
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Some(bytes) = hex::decode(value) {
                    candidates.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if candidates.is_empty() {
        return Err(SignatureError::Malformed);
    }

    let matched = candidates
        .iter()
        .any(|sig| mac_for(secret, timestamp, payload).verify_slice(sig).is_ok());
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    if (now - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }
    Ok(())
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string, returning `None` on odd length or bad digits.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"type":"payment_intent.succeeded"}"#;

    #[test]
    fn signed_header_verifies() {
        let header = sign_header(SECRET, 1_700_000_000, BODY);
        assert_eq!(verify_header(SECRET, &header, BODY, 1_700_000_010, 300), Ok(()));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let header = sign_header(SECRET, 1_700_000_000, BODY);
        let result = verify_header(SECRET, &header, b"{}", 1_700_000_000, 300);
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = sign_header("other", 1_700_000_000, BODY);
        let result = verify_header(SECRET, &header, BODY, 1_700_000_000, 300);
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let header = sign_header(SECRET, 1_700_000_000, BODY);
        let result = verify_header(SECRET, &header, BODY, 1_700_000_301, 300);
        assert_eq!(result, Err(SignatureError::Expired));
    }

    #[test]
    fn any_matching_v1_is_accepted() {
        let good = compute_signature(SECRET, 1_700_000_000, BODY);
        let header = format!("t=1700000000,v1=deadbeef,v1={good},v0=ignored");
        assert_eq!(verify_header(SECRET, &header, BODY, 1_700_000_000, 300), Ok(()));
    }

    #[test]
    fn missing_parts_are_malformed() {
        assert_eq!(
            verify_header(SECRET, "v1=abcd", BODY, 0, 300),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_header(SECRET, "t=5", BODY, 5, 300),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_header(SECRET, "garbage", BODY, 5, 300),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(hex::decode(&hex::encode([0u8, 15, 255])), Some(vec![0, 15, 255]));
        assert_eq!(hex::decode("abc"), None);
        assert_eq!(hex::decode("zz"), None);
    }
}
