//! REST client for the Stripe PaymentIntents API.
//!
//! Stripe takes form-encoded request bodies and authenticates with the
//! secret key as a bearer token.

use std::collections::HashMap;

use academy_core::payments::ItemKind;
use academy_core::types::DbId;
use serde::Deserialize;

use crate::config::StripeConfig;

/// A PaymentIntent as returned by Stripe (only the fields we read).
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Lower-case ISO currency code.
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

/// Parameters for a new PaymentIntent for a course or event purchase.
#[derive(Debug, Clone)]
pub struct IntentRequest {
    pub kind: ItemKind,
    pub item_id: DbId,
    pub item_title: String,
    pub user_id: DbId,
    pub amount_cents: i64,
}

impl IntentRequest {
    /// Form fields in Stripe's bracketed metadata notation.
    pub fn form_params(&self) -> Vec<(String, String)> {
        let item = self.kind.as_str();
        vec![
            ("amount".into(), self.amount_cents.to_string()),
            ("currency".into(), "eur".into()),
            ("metadata[type]".into(), item.into()),
            (format!("metadata[{item}_id]"), self.item_id.to_string()),
            ("metadata[user_id]".into(), self.user_id.to_string()),
            (format!("metadata[{item}_title]"), self.item_title.clone()),
            (
                "description".into(),
                format!("{}: {}", self.kind.label(), self.item_title),
            ),
        ]
    }
}

/// Errors from the Stripe REST layer.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Stripe returned a non-2xx status code.
    #[error("Stripe API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The configured API base cannot carry a PaymentIntent path.
    #[error("Invalid Stripe API base: {0}")]
    InvalidBase(String),
}

/// HTTP client bound to one Stripe account.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client when a secret key is configured.
    pub fn from_config(config: &StripeConfig) -> Option<Self> {
        config
            .secret_key
            .clone()
            .map(|key| Self::new(key, config.api_base.clone()))
    }

    /// `POST /v1/payment_intents`.
    pub async fn create_payment_intent(
        &self,
        request: &IntentRequest,
    ) -> Result<PaymentIntent, StripeError> {
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&request.form_params())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /v1/payment_intents/{id}`.
    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        let response = self
            .client
            .get(self.intent_url(id)?)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// URL of one PaymentIntent. `id` is pushed as a single percent-encoded
    /// path segment, so `/`, `..` and `?` cannot leave `/v1/payment_intents`.
    fn intent_url(&self, id: &str) -> Result<reqwest::Url, StripeError> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .map_err(|e| StripeError::InvalidBase(format!("{}: {e}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|()| StripeError::InvalidBase(self.api_base.clone()))?
            .pop_if_empty()
            .extend(["v1", "payment_intents", id]);
        Ok(url)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StripeError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn course_intent_metadata() {
        let request = IntentRequest {
            kind: ItemKind::Course,
            item_id: 7,
            item_title: "Clinical Pharmacology".into(),
            user_id: 42,
            amount_cents: 4999,
        };
        let params = request.form_params();
        assert_eq!(field(&params, "amount"), Some("4999"));
        assert_eq!(field(&params, "currency"), Some("eur"));
        assert_eq!(field(&params, "metadata[type]"), Some("course"));
        assert_eq!(field(&params, "metadata[course_id]"), Some("7"));
        assert_eq!(field(&params, "metadata[user_id]"), Some("42"));
        assert_eq!(
            field(&params, "metadata[course_title]"),
            Some("Clinical Pharmacology")
        );
        assert_eq!(
            field(&params, "description"),
            Some("Course: Clinical Pharmacology")
        );
    }

    #[test]
    fn event_intent_uses_event_keys() {
        let request = IntentRequest {
            kind: ItemKind::Event,
            item_id: 3,
            item_title: "Nursing Congress".into(),
            user_id: 1,
            amount_cents: 100,
        };
        let params = request.form_params();
        assert_eq!(field(&params, "metadata[event_id]"), Some("3"));
        assert_eq!(field(&params, "description"), Some("Event: Nursing Congress"));
        assert!(field(&params, "metadata[course_id]").is_none());
    }

    #[test]
    fn intent_deserializes_without_optional_fields() {
        let intent: PaymentIntent = serde_json::from_str(
            r#"{"id":"pi_1","amount":500,"currency":"eur","status":"requires_payment_method"}"#,
        )
        .unwrap();
        assert!(!intent.is_succeeded());
        assert!(intent.metadata.is_empty());
        assert!(intent.client_secret.is_none());
    }

    #[test]
    fn intent_url_keeps_id_in_one_segment() {
        let client = StripeClient::new("sk".into(), "http://localhost:12111".into());

        let url = client.intent_url("pi_3Nabc123").unwrap();
        assert_eq!(url.as_str(), "http://localhost:12111/v1/payment_intents/pi_3Nabc123");

        let url = client.intent_url("pi_x/../../charges/ch_1").unwrap();
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(&segments[..2], ["v1", "payment_intents"]);
        assert!(!segments[2].contains('/'));
        assert!(url.query().is_none());

        let url = client.intent_url("pi_a?expand[]=customer").unwrap();
        assert!(url.query().is_none());
        assert_eq!(url.path_segments().unwrap().count(), 3);
    }

    #[test]
    fn intent_url_respects_base_path() {
        let client = StripeClient::new("sk".into(), "http://mock.local/stripe/".into());
        let url = client.intent_url("pi_1").unwrap();
        assert_eq!(url.path(), "/stripe/v1/payment_intents/pi_1");
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let client = StripeClient::new("sk".into(), "http://localhost:12111/".into());
        assert_eq!(client.api_base, "http://localhost:12111");
    }
}
