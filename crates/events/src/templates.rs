//! Plain-text transactional email templates.

use academy_core::payments::format_cents;
use academy_core::types::{DbId, Timestamp};
use academy_core::validation::RESET_CODE_EXPIRY_MINS;

use crate::delivery::email::OutgoingEmail;

const DEFAULT_APP_NAME: &str = "Focus Health Academy";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:19006";

/// Longest course description quoted in a receipt.
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Product name and public URL used in every email.
#[derive(Debug, Clone)]
pub struct Branding {
    pub app_name: String,
    pub frontend_url: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
        }
    }
}

impl Branding {
    /// Load from `APP_NAME` and `FRONTEND_URL`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            app_name: std::env::var("APP_NAME").unwrap_or(defaults.app_name),
            frontend_url: std::env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
        }
    }

    fn signature(&self) -> String {
        format!("\n\n-- \nThe {} team\n{}", self.app_name, self.frontend_url)
    }
}

/// Data for the course purchase receipt.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub to: String,
    pub user_name: String,
    pub course_id: DbId,
    pub course_title: String,
    pub course_description: String,
    pub amount_cents: i64,
    pub currency: String,
    pub order_id: DbId,
    pub payment_reference: String,
    pub purchased_at: Timestamp,
    pub lesson_count: i64,
    pub duration_weeks: i32,
    pub instructor_name: Option<String>,
}

/// Data for the course completion email.
#[derive(Debug, Clone)]
pub struct CertificateNotice {
    pub to: String,
    pub user_name: String,
    pub course_id: DbId,
    pub course_title: String,
    pub certificate_id: String,
    pub completed_at: Timestamp,
    pub instructor_name: Option<String>,
    pub lesson_count: i64,
    pub duration_weeks: i32,
}

pub fn welcome(branding: &Branding, to: &str, user_name: &str) -> OutgoingEmail {
    let app = &branding.app_name;
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("Welcome to {app}!"),
        body: format!(
            "Hi {user_name},\n\n\
             Your {app} account is ready. Browse courses and upcoming events at {url}.{sig}",
            url = branding.frontend_url,
            sig = branding.signature(),
        ),
    }
}

pub fn password_reset(branding: &Branding, to: &str, user_name: &str, code: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("Reset Your Password - {}", branding.app_name),
        body: format!(
            "Hi {user_name},\n\n\
             Your password reset code is: {code}\n\n\
             The code expires in {RESET_CODE_EXPIRY_MINS} minutes. If you did not request a \
             reset you can ignore this email.{sig}",
            sig = branding.signature(),
        ),
    }
}

pub fn purchase_confirmation(branding: &Branding, receipt: &PurchaseReceipt) -> OutgoingEmail {
    let description = truncate(&receipt.course_description, DESCRIPTION_PREVIEW_CHARS);
    let instructor = receipt
        .instructor_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(&branding.app_name);

    OutgoingEmail {
        to: receipt.to.clone(),
        subject: format!("Payment Successful - {}", receipt.course_title),
        body: format!(
            "Hi {user},\n\n\
             Thank you for your purchase.\n\n\
             Course: {title}\n\
             {description}\n\n\
             Amount: {amount} {currency}\n\
             Order: #{order}\n\
             Payment reference: {reference}\n\
             Date: {date}\n\
             Lessons: {lessons}\n\
             Duration: {duration}\n\
             Instructor: {instructor}\n\n\
             Start learning: {url}/courses/{course_id}{sig}",
            user = receipt.user_name,
            title = receipt.course_title,
            amount = format_cents(receipt.amount_cents),
            currency = receipt.currency,
            order = receipt.order_id,
            reference = receipt.payment_reference,
            date = receipt.purchased_at.format("%B %d, %Y at %I:%M %p"),
            lessons = receipt.lesson_count,
            duration = duration_label(receipt.duration_weeks),
            url = branding.frontend_url,
            course_id = receipt.course_id,
            sig = branding.signature(),
        ),
    }
}

pub fn certificate(branding: &Branding, notice: &CertificateNotice) -> OutgoingEmail {
    let instructor = notice
        .instructor_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(&branding.app_name);

    OutgoingEmail {
        to: notice.to.clone(),
        subject: format!("Congratulations! You've Completed {}", notice.course_title),
        body: format!(
            "Hi {user},\n\n\
             You have completed \"{title}\".\n\n\
             Certificate: {cert}\n\
             Completed on: {date}\n\
             Instructor: {instructor}\n\
             Lessons: {lessons}\n\
             Duration: {duration}\n\n\
             View your certificate: {url}/courses/{course_id}{sig}",
            user = notice.user_name,
            title = notice.course_title,
            cert = notice.certificate_id,
            date = notice.completed_at.format("%B %d, %Y"),
            lessons = notice.lesson_count,
            duration = duration_label(notice.duration_weeks),
            url = branding.frontend_url,
            course_id = notice.course_id,
            sig = branding.signature(),
        ),
    }
}

pub fn account_deleted(branding: &Branding, to: &str, user_name: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("Account Deletion Confirmation - {}", branding.app_name),
        body: format!(
            "Hi {user_name},\n\n\
             Your {app} account and all associated data have been permanently deleted.\n\
             We're sorry to see you go.{sig}",
            app = branding.app_name,
            sig = branding.signature(),
        ),
    }
}

fn duration_label(weeks: i32) -> String {
    if weeks > 0 {
        format!("{weeks} weeks")
    } else {
        "Self-paced".to_string()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
