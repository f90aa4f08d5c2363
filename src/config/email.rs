//! Email configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration (Brevo)
///
/// Credentials are optional: without them the service runs and every receipt
/// email fails at send time.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Brevo API key
    #[serde(default)]
    pub brevo_api_key: Option<String>,

    /// Sender address
    #[serde(default)]
    pub sender_email: Option<String>,

    /// Sender display name
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
}

impl EmailConfig {
    /// Whether both API key and sender are present
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().map(|s| !s.is_empty()).unwrap_or(false);
        present(&self.brevo_api_key) && present(&self.sender_email)
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(sender) = &self.sender_email {
            if !sender.is_empty() && !sender.contains('@') {
                return Err(ValidationError::InvalidSenderEmail);
            }
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            brevo_api_key: None,
            sender_email: None,
            sender_name: default_sender_name(),
        }
    }
}

fn default_sender_name() -> String {
    "Life Gate Ministries".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unconfigured_but_valid() {
        let config = EmailConfig::default();
        assert!(!config.is_configured());
        assert!(config.validate().is_ok());
        assert_eq!(config.sender_name, "Life Gate Ministries");
    }

    #[test]
    fn test_configured_requires_key_and_sender() {
        let config = EmailConfig {
            brevo_api_key: Some("xkeysib-123".to_string()),
            sender_email: Some("giving@example.org".to_string()),
            ..Default::default()
        };
        assert!(config.is_configured());

        let config = EmailConfig {
            brevo_api_key: Some("xkeysib-123".to_string()),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn test_validation_invalid_sender() {
        let config = EmailConfig {
            sender_email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSenderEmail));
    }
}
