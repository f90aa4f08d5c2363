//! Webhook error types.
//!
//! Every error maps to an HTTP status that drives provider retry behavior:
//! 2xx acknowledges, 4xx stops retries, 5xx asks for redelivery.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::donation::LedgerError;
use crate::domain::foundation::ValidationError;

/// Errors that occur while ingesting a provider webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header absent.
    #[error("Missing signature header")]
    MissingSignature,

    /// Signature did not match the body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signed timestamp too far in the future.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Body or signature header could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Payload decoded but failed normalization.
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] ValidationError),

    /// Event type is not a donation; acknowledged without state change.
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// The ledger could not record the donation.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl WebhookError {
    /// Returns true if the provider should redeliver this webhook.
    pub fn is_retryable(&self) -> bool {
        match self {
            WebhookError::Ledger(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Whether this is an authentication failure.
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,

            WebhookError::Ignored(_) => StatusCode::OK,

            WebhookError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Display
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(WebhookError::InvalidSignature.to_string(), "Invalid signature");
    }

    #[test]
    fn parse_error_displays_message() {
        let err = WebhookError::ParseError("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Parse error: invalid JSON");
    }

    #[test]
    fn ignored_displays_event_type() {
        let err = WebhookError::Ignored("charge.failed".to_string());
        assert_eq!(err.to_string(), "Event ignored: charge.failed");
    }

    // ══════════════════════════════════════════════════════════════
    // Retryability
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn ledger_conflict_is_retryable() {
        let err = WebhookError::Ledger(LedgerError::TransactionConflict { attempts: 5 });
        assert!(err.is_retryable());
    }

    #[test]
    fn signature_failures_are_not_retryable() {
        assert!(!WebhookError::InvalidSignature.is_retryable());
        assert!(!WebhookError::TimestampOutOfRange.is_retryable());
        assert!(!WebhookError::MissingSignature.is_retryable());
    }

    #[test]
    fn invalid_payload_is_not_retryable() {
        let err: WebhookError = ValidationError::empty_field("reference").into();
        assert!(!err.is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Status codes
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_failures_return_bad_request() {
        for err in [
            WebhookError::MissingSignature,
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
        ] {
            assert!(err.is_signature_failure());
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn parse_error_returns_bad_request() {
        let err = WebhookError::ParseError("syntax".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ignored_returns_ok() {
        let err = WebhookError::Ignored("customer.created".to_string());
        assert_eq!(err.status_code(), StatusCode::OK);
    }

    #[test]
    fn ledger_failure_returns_internal_error() {
        let err = WebhookError::Ledger(LedgerError::storage("connection lost"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
