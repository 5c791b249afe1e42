//! Account input validation and password-reset codes.

use rand::Rng;

use crate::types::Timestamp;

/// Default minimum password length for registration and resets.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Number of digits in a password-reset code.
pub const RESET_CODE_LENGTH: usize = 6;

/// Lifetime of a password-reset code.
pub const RESET_CODE_EXPIRY_MINS: i64 = 15;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Require at least `min_length` characters.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    Ok(())
}

/// Require the confirmation field to repeat the password.
pub fn validate_password_match(password: &str, confirmation: &str) -> Result<(), String> {
    if password != confirmation {
        return Err("Password fields didn't match.".to_string());
    }
    Ok(())
}

/// Shallow email shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<(), String> {
    let invalid = || Err("Enter a valid email address.".to_string());

    let Some((local, domain)) = email.split_once('@') else {
        return invalid();
    };
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return invalid();
    }
    Ok(())
}

/// Trim whitespace and lowercase the domain part of an email address.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Usernames are 1..=150 characters of letters, digits and `@.+-_`.
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if len == 0 || len > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username must be between 1 and {MAX_USERNAME_LENGTH} characters"
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(
            "Username may contain only letters, numbers, and @/./+/-/_ characters.".to_string(),
        );
    }
    Ok(())
}

/// Generate a random zero-padded 6-digit reset code.
pub fn generate_reset_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

/// Check that `code` looks like a reset code before hitting the database.
pub fn is_valid_reset_code(code: &str) -> bool {
    code.len() == RESET_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a code created at `created_at` has expired at `now`.
pub fn reset_code_expired(created_at: Timestamp, now: Timestamp) -> bool {
    now - created_at > chrono::Duration::minutes(RESET_CODE_EXPIRY_MINS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn password_length_boundary() {
        assert!(validate_password_strength("short", 8).is_err());
        assert!(validate_password_strength("8letters", 8).is_ok());
        let msg = validate_password_strength("", 8).unwrap_err();
        assert!(msg.contains("at least 8 characters"));
    }

    #[test]
    fn password_confirmation_must_match() {
        assert!(validate_password_match("secret-pass", "secret-pass").is_ok());
        assert!(validate_password_match("secret-pass", "secret-pas").is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());

        for bad in ["", "plain", "@example.com", "a@b", "a@@b.com", "a b@c.com", "a@.com", "a@b."] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn normalize_lowercases_domain_only() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "Ada@example.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("ada_lovelace.1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn reset_codes_are_six_digits() {
        for _ in 0..50 {
            let code = generate_reset_code();
            assert!(is_valid_reset_code(&code), "{code} is not a valid code");
        }
        assert!(!is_valid_reset_code("12345"));
        assert!(!is_valid_reset_code("12345a"));
        assert!(!is_valid_reset_code("1234567"));
    }

    #[test]
    fn reset_code_expiry_window() {
        let now = Utc::now();
        assert!(!reset_code_expired(now - Duration::minutes(14), now));
        assert!(!reset_code_expired(now - Duration::minutes(15), now));
        assert!(reset_code_expired(now - Duration::minutes(16), now));
    }
}
