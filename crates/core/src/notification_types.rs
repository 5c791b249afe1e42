//! Notification type and link-type constants.
//!
//! These must match the `ck_notifications_type` CHECK constraint.

pub const COURSE_ENROLLMENT: &str = "course_enrollment";
pub const EVENT_REGISTRATION: &str = "event_registration";
pub const PAYMENT_SUCCESS: &str = "payment_success";
pub const COURSE_UPDATE: &str = "course_update";
pub const EVENT_UPDATE: &str = "event_update";
pub const EVENT_REMINDER: &str = "event_reminder";
pub const POST_LIKE: &str = "post_like";
pub const POST_COMMENT: &str = "post_comment";
pub const COMMENT_REPLY: &str = "comment_reply";
pub const ADMIN_ANNOUNCEMENT: &str = "admin_announcement";
pub const CERTIFICATE_READY: &str = "certificate_ready";

/// All valid notification types.
pub const VALID_TYPES: &[&str] = &[
    COURSE_ENROLLMENT,
    EVENT_REGISTRATION,
    PAYMENT_SUCCESS,
    COURSE_UPDATE,
    EVENT_UPDATE,
    EVENT_REMINDER,
    POST_LIKE,
    POST_COMMENT,
    COMMENT_REPLY,
    ADMIN_ANNOUNCEMENT,
    CERTIFICATE_READY,
];

pub const LINK_COURSE: &str = "course";
pub const LINK_EVENT: &str = "event";
pub const LINK_POST: &str = "post";
pub const LINK_ENROLLMENT: &str = "enrollment";

/// Maximum characters of a comment quoted in a notification.
pub const PREVIEW_CHARS: usize = 50;

/// Shorten `text` to [`PREVIEW_CHARS`] characters, appending `...` when cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(preview("nice post"), "nice post");
    }

    #[test]
    fn long_text_is_cut_at_fifty_chars() {
        let text = "a".repeat(60);
        let out = preview(&text);
        assert_eq!(out.len(), 53);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn exactly_fifty_chars_is_untouched() {
        let text = "b".repeat(50);
        assert_eq!(preview(&text), text);
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let text = "é".repeat(51);
        assert_eq!(preview(&text).chars().count(), 53);
    }
}
