//! Brevo email sender.
//!
//! Credentials are optional at construction so the service can start without
//! mail configured; each send then fails with `MissingCredentials`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ports::{DeliveryError, EmailMessage, NotificationSender};

/// Brevo transactional email endpoint.
pub const BREVO_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

const DEFAULT_SENDER_NAME: &str = "Life Gate Ministries";

/// Default per-request timeout for the Brevo API.
pub const DEFAULT_BREVO_TIMEOUT: Duration = Duration::from_secs(10);

/// Brevo API configuration.
#[derive(Clone)]
pub struct BrevoConfig {
    api_key: Option<SecretString>,
    sender_email: Option<String>,
    sender_name: String,
    api_url: String,
    timeout: Duration,
}

impl BrevoConfig {
    pub fn new(api_key: Option<String>, sender_email: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()).map(SecretString::new),
            sender_email: sender_email.filter(|e| !e.is_empty()),
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            api_url: BREVO_API_URL.to_string(),
            timeout: DEFAULT_BREVO_TIMEOUT,
        }
    }

    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom API URL (for testing).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct Contact<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    sender: Contact<'a>,
    to: Vec<Contact<'a>>,
    subject: &'a str,
    html_content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailResponse {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// `NotificationSender` backed by Brevo.
pub struct BrevoEmailSender {
    config: BrevoConfig,
    http_client: reqwest::Client,
}

impl BrevoEmailSender {
    pub fn new(config: BrevoConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Falling back to default HTTP client for Brevo");
                reqwest::Client::new()
            });

        Self { config, http_client }
    }

    pub fn with_client(config: BrevoConfig, http_client: reqwest::Client) -> Self {
        Self { config, http_client }
    }

    fn build_request<'a>(
        &'a self,
        sender_email: &'a str,
        message: &'a EmailMessage,
    ) -> SendEmailRequest<'a> {
        let to_name = if message.to_name.trim().is_empty() {
            message.to_email.as_str()
        } else {
            message.to_name.as_str()
        };

        SendEmailRequest {
            sender: Contact {
                email: sender_email,
                name: &self.config.sender_name,
            },
            to: vec![Contact {
                email: &message.to_email,
                name: to_name,
            }],
            subject: &message.subject,
            html_content: &message.html,
        }
    }
}

#[async_trait]
impl NotificationSender for BrevoEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<String, DeliveryError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(DeliveryError::MissingCredentials("EMAIL__BREVO_API_KEY"))?;
        let sender_email = self
            .config
            .sender_email
            .as_deref()
            .ok_or(DeliveryError::MissingCredentials("EMAIL__SENDER_EMAIL"))?;
        if message.to_email.trim().is_empty() {
            return Err(DeliveryError::MissingCredentials("recipient email"));
        }

        let body = self.build_request(sender_email, message);

        let response = self
            .http_client
            .post(&self.config.api_url)
            .header("api-key", api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed: SendEmailResponse = serde_json::from_str(&text).unwrap_or_default();

        if !status.is_success() {
            let message = parsed
                .message
                .unwrap_or_else(|| "Brevo email failed".to_string());
            tracing::warn!(status = status.as_u16(), error = %message, "Brevo rejected email");
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let message_id = parsed.message_id.unwrap_or_default();
        tracing::debug!(message_id = %message_id, "Brevo accepted email");
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            to_email: "jane@x.com".to_string(),
            to_name: "Jane Doe".to_string(),
            subject: "Donation Receipt - Life Gate Ministries Worldwide".to_string(),
            html: "<p>Thank you</p>".to_string(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Request Shape
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn request_serializes_to_brevo_shape() {
        let sender = BrevoEmailSender::new(
            BrevoConfig::new(Some("key".to_string()), Some("giving@x.org".to_string()))
                .with_sender_name("Giving Team"),
        );
        let msg = message();

        let json = serde_json::to_value(sender.build_request("giving@x.org", &msg)).unwrap();

        assert_eq!(json["sender"]["email"], "giving@x.org");
        assert_eq!(json["sender"]["name"], "Giving Team");
        assert_eq!(json["to"][0]["email"], "jane@x.com");
        assert_eq!(json["to"][0]["name"], "Jane Doe");
        assert_eq!(json["htmlContent"], "<p>Thank you</p>");
        assert_eq!(json["subject"], msg.subject);
    }

    #[test]
    fn blank_recipient_name_falls_back_to_email() {
        let sender = BrevoEmailSender::new(BrevoConfig::new(None, None));
        let mut msg = message();
        msg.to_name = "  ".to_string();

        let json = serde_json::to_value(sender.build_request("giving@x.org", &msg)).unwrap();

        assert_eq!(json["to"][0]["name"], "jane@x.com");
    }

    #[test]
    fn timeout_defaults_and_overrides() {
        let config = BrevoConfig::new(None, None);
        assert_eq!(config.timeout, DEFAULT_BREVO_TIMEOUT);

        let config = config.with_timeout(Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn response_parses_message_id() {
        let parsed: SendEmailResponse =
            serde_json::from_str(r#"{"messageId":"<abc@smtp-relay>"}"#).unwrap();
        assert_eq!(parsed.message_id.as_deref(), Some("<abc@smtp-relay>"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Missing Credentials
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_api_key_fails_without_request() {
        let sender = BrevoEmailSender::new(BrevoConfig::new(None, Some("giving@x.org".to_string())));

        let result = sender.send(&message()).await;

        assert_eq!(
            result,
            Err(DeliveryError::MissingCredentials("EMAIL__BREVO_API_KEY"))
        );
    }

    #[tokio::test]
    async fn empty_sender_counts_as_missing() {
        let sender = BrevoEmailSender::new(BrevoConfig::new(
            Some("key".to_string()),
            Some(String::new()),
        ));

        let result = sender.send(&message()).await;

        assert_eq!(
            result,
            Err(DeliveryError::MissingCredentials("EMAIL__SENDER_EMAIL"))
        );
    }

    #[tokio::test]
    async fn missing_recipient_is_rejected() {
        let sender = BrevoEmailSender::new(BrevoConfig::new(
            Some("key".to_string()),
            Some("giving@x.org".to_string()),
        ));
        let mut msg = message();
        msg.to_email = String::new();

        let result = sender.send(&msg).await;

        assert_eq!(result, Err(DeliveryError::MissingCredentials("recipient email")));
    }
}
