//! Stripe configuration loaded from the environment.

/// Default Stripe REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Stripe credentials. Every key is optional; card payments are disabled
/// when the secret key is missing, and webhooks are accepted unverified
/// when the webhook secret is missing.
#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub publishable_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base: String,
}

impl StripeConfig {
    /// Load from environment variables.
    ///
    /// | Env var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `STRIPE_SECRET_KEY`      | unset                    |
    /// | `STRIPE_PUBLISHABLE_KEY` | unset                    |
    /// | `STRIPE_WEBHOOK_SECRET`  | unset                    |
    /// | `STRIPE_API_BASE`        | `https://api.stripe.com` |
    pub fn from_env() -> Self {
        Self {
            secret_key: non_empty_var("STRIPE_SECRET_KEY"),
            publishable_key: non_empty_var("STRIPE_PUBLISHABLE_KEY"),
            webhook_secret: non_empty_var("STRIPE_WEBHOOK_SECRET"),
            api_base: non_empty_var("STRIPE_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }

    /// Whether card payments can be taken.
    pub fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
