//! In-app notifications for domain actions.
//!
//! The free functions build a [`CreateNotification`] for each kind of
//! action; [`Notifier`] persists them. Builders for actions a user performs
//! on their own content return `None` so self-likes and self-comments never
//! notify.

use academy_core::notification_types as nt;
use academy_core::payments::{format_cents, ItemKind};
use academy_core::types::DbId;
use academy_db::models::notification::{CreateNotification, Notification};
use academy_db::repositories::NotificationRepo;
use sqlx::PgPool;

pub fn course_enrollment(user_id: DbId, course_id: DbId, course_title: &str) -> CreateNotification {
    CreateNotification {
        user_id,
        notification_type: nt::COURSE_ENROLLMENT,
        title: "Course Enrollment Successful".to_string(),
        message: format!("You have successfully enrolled in \"{course_title}\""),
        link_type: Some(nt::LINK_COURSE),
        link_id: Some(course_id),
    }
}

pub fn event_registration(user_id: DbId, event_id: DbId, event_title: &str) -> CreateNotification {
    CreateNotification {
        user_id,
        notification_type: nt::EVENT_REGISTRATION,
        title: "Event Registration Successful".to_string(),
        message: format!("You have successfully registered for \"{event_title}\""),
        link_type: Some(nt::LINK_EVENT),
        link_id: Some(event_id),
    }
}

pub fn payment_success(
    user_id: DbId,
    amount_cents: i64,
    currency: &str,
    kind: ItemKind,
    item_title: &str,
) -> CreateNotification {
    CreateNotification {
        user_id,
        notification_type: nt::PAYMENT_SUCCESS,
        title: "Payment Successful".to_string(),
        message: format!(
            "Your payment of {} {currency} for {} \"{item_title}\" was successful",
            format_cents(amount_cents),
            kind.as_str(),
        ),
        link_type: None,
        link_id: None,
    }
}

pub fn post_like(
    author_id: DbId,
    post_id: DbId,
    liker_id: DbId,
    liker_name: &str,
) -> Option<CreateNotification> {
    (author_id != liker_id).then(|| CreateNotification {
        user_id: author_id,
        notification_type: nt::POST_LIKE,
        title: "New Like".to_string(),
        message: format!("{liker_name} liked your post"),
        link_type: Some(nt::LINK_POST),
        link_id: Some(post_id),
    })
}

pub fn post_comment(
    author_id: DbId,
    post_id: DbId,
    commenter_id: DbId,
    commenter_name: &str,
    comment: &str,
) -> Option<CreateNotification> {
    (author_id != commenter_id).then(|| CreateNotification {
        user_id: author_id,
        notification_type: nt::POST_COMMENT,
        title: "New Comment".to_string(),
        message: format!("{commenter_name} commented: \"{}\"", nt::preview(comment)),
        link_type: Some(nt::LINK_POST),
        link_id: Some(post_id),
    })
}

pub fn certificate_ready(
    user_id: DbId,
    enrollment_id: DbId,
    course_title: &str,
) -> CreateNotification {
    CreateNotification {
        user_id,
        notification_type: nt::CERTIFICATE_READY,
        title: "Certificate Ready".to_string(),
        message: format!("Your certificate for \"{course_title}\" is ready"),
        link_type: Some(nt::LINK_ENROLLMENT),
        link_id: Some(enrollment_id),
    }
}

/// Persists notifications, logging instead of failing.
#[derive(Clone)]
pub struct Notifier {
    pool: PgPool,
}

impl Notifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a notification. Errors are logged and reported as `None`.
    pub async fn send(&self, input: CreateNotification) -> Option<Notification> {
        match NotificationRepo::create(&self.pool, &input).await {
            Ok(n) => {
                tracing::debug!(
                    notification_id = n.id,
                    user_id = n.user_id,
                    notification_type = %n.notification_type,
                    "Notification created"
                );
                Some(n)
            }
            Err(e) => {
                tracing::warn!(
                    user_id = input.user_id,
                    notification_type = input.notification_type,
                    error = %e,
                    "Failed to create notification"
                );
                None
            }
        }
    }

    /// Store a notification when the builder produced one.
    pub async fn send_opt(&self, input: Option<CreateNotification>) -> Option<Notification> {
        match input {
            Some(input) => self.send(input).await,
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_like_does_not_notify() {
        assert!(post_like(1, 10, 1, "Ada").is_none());
        let n = post_like(1, 10, 2, "Grace").unwrap();
        assert_eq!(n.user_id, 1);
        assert_eq!(n.message, "Grace liked your post");
        assert_eq!(n.link_type, Some(nt::LINK_POST));
    }

    #[test]
    fn comment_preview_is_truncated() {
        let long = "a".repeat(80);
        let n = post_comment(1, 10, 2, "Grace", &long).unwrap();
        assert_eq!(n.message, format!("Grace commented: \"{}...\"", "a".repeat(50)));
        assert!(post_comment(1, 10, 1, "Ada", "mine").is_none());
    }

    #[test]
    fn payment_message_includes_amount_and_kind() {
        let n = payment_success(3, 4900, "EUR", ItemKind::Event, "Congress");
        assert_eq!(
            n.message,
            "Your payment of 49.00 EUR for event \"Congress\" was successful"
        );
        assert_eq!(n.notification_type, nt::PAYMENT_SUCCESS);
        assert!(n.link_id.is_none());
    }

    #[test]
    fn every_builder_uses_a_valid_type() {
        let built = [
            course_enrollment(1, 2, "c"),
            event_registration(1, 2, "e"),
            payment_success(1, 0, "EUR", ItemKind::Course, "c"),
            certificate_ready(1, 2, "c"),
        ];
        for n in built {
            assert!(nt::VALID_TYPES.contains(&n.notification_type));
        }
    }
}
