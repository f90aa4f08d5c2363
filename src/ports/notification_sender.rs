//! Outbound notification port.
//!
//! Delivery is best-effort. Callers log failures and carry on; a lost email
//! can be resent, a lost ledger update cannot.

use async_trait::async_trait;
use thiserror::Error;

/// A single HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
}

/// Why a notification was not delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// API key, sender or recipient not configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// The transport answered with a non-success status.
    #[error("Rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request never completed.
    #[error("Transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends the message, returning the transport's message id.
    async fn send(&self, message: &EmailMessage) -> Result<String, DeliveryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_sender_is_object_safe() {
        fn _accepts_dyn(_sender: &dyn NotificationSender) {}
    }

    #[test]
    fn rejected_displays_status() {
        let err = DeliveryError::Rejected {
            status: 401,
            message: "Key not found".to_string(),
        };
        assert_eq!(err.to_string(), "Rejected with status 401: Key not found");
    }
}
