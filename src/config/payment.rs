//! Payment configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key. Only needed to look up subscriptions for
    /// invoices that carry no tenant metadata.
    #[serde(default)]
    pub stripe_api_key: Option<String>,

    /// Stripe webhook signing secret
    #[serde(default)]
    pub stripe_webhook_secret: String,

    /// Maximum accepted age of a webhook signature, in seconds
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: i64,

    /// Base URL for the Stripe REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl PaymentConfig {
    /// Webhook signing secret, wrapped for handing to the verifier.
    pub fn webhook_secret(&self) -> SecretString {
        SecretString::new(self.stripe_webhook_secret.clone())
    }

    /// API key, if one is configured.
    pub fn api_key(&self) -> Option<SecretString> {
        self.api_key_str()
            .map(|key| SecretString::new(key.to_string()))
    }

    fn api_key_str(&self) -> Option<&str> {
        self.stripe_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if let Some(key) = self.api_key_str() {
            if !key.starts_with("sk_") && !key.starts_with("rk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
        }

        if !(1..=3600).contains(&self.signature_tolerance_secs) {
            return Err(ValidationError::InvalidSignatureTolerance);
        }
        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://") {
            return Err(ValidationError::InvalidStripeBaseUrl);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: None,
            stripe_webhook_secret: String::new(),
            signature_tolerance_secs: default_signature_tolerance(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_signature_tolerance() -> i64 {
    300
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}
