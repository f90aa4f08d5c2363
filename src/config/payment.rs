//! Payment gateway configuration

use serde::Deserialize;

use crate::domain::webhook::DEFAULT_TOLERANCE_SECS;

use super::error::ValidationError;

/// Payment configuration (Stripe and Paystack webhook secrets)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key; only checked for mode, donations arrive by webhook
    #[serde(default)]
    pub stripe_api_key: Option<String>,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    /// Accepted age of a signed Stripe timestamp, in seconds
    #[serde(default = "default_tolerance")]
    pub stripe_tolerance_secs: i64,

    /// Paystack secret key; also the webhook HMAC key
    pub paystack_secret_key: String,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key
            .as_deref()
            .map(|k| k.starts_with("sk_test_"))
            .unwrap_or(false)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_WEBHOOK_SECRET"));
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if let Some(key) = &self.stripe_api_key {
            if !key.starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
        }
        if self.stripe_tolerance_secs <= 0 || self.stripe_tolerance_secs > 3_600 {
            return Err(ValidationError::InvalidSignatureTolerance);
        }
        if self.paystack_secret_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__PAYSTACK_SECRET_KEY"));
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: None,
            stripe_webhook_secret: String::new(),
            stripe_tolerance_secs: default_tolerance(),
            paystack_secret_key: String::new(),
        }
    }
}

fn default_tolerance() -> i64 {
    DEFAULT_TOLERANCE_SECS
}
