//! ProcessWebhookHandler - Command handler for payment gateway webhooks.
//!
//! Order of operations:
//! 1. Verify the signature over the exact request bytes
//! 2. Decode the provider payload and normalize it to a `DonationEvent`
//! 3. Apply the event to the ledger (one transaction)
//! 4. After commit, spawn the receipt email for newly applied donations
//!
//! The email runs on its own task under `email_timeout`, so a slow mail
//! provider never delays the gateway acknowledgement.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::donation::{
    ApplyOutcome, DonationProvider, Notification, PaystackEvent, StripeEvent,
};
use crate::domain::foundation::DonationReference;
use crate::domain::receipt::{render, ReceiptBranding, ReceiptFormat};
use crate::domain::webhook::{SignatureVerifier, WebhookError};
use crate::ports::{DonationLedger, EmailMessage, NotificationSender};

/// Gateway a webhook was delivered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookGateway {
    Stripe,
    Paystack,
}

impl WebhookGateway {
    pub fn provider(&self) -> DonationProvider {
        match self {
            WebhookGateway::Stripe => DonationProvider::CardGateway,
            WebhookGateway::Paystack => DonationProvider::RegionalGateway,
        }
    }

    fn decode(&self, payload: &[u8]) -> Result<Notification, serde_json::Error> {
        match self {
            WebhookGateway::Stripe => serde_json::from_slice::<StripeEvent>(payload)?.into_notification(),
            WebhookGateway::Paystack => {
                serde_json::from_slice::<PaystackEvent>(payload)?.into_notification()
            }
        }
    }
}

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body, untouched.
    pub payload: Vec<u8>,
    /// Signature header value, if present.
    pub signature: Option<String>,
}

/// Upper bound on one receipt email attempt.
pub const DEFAULT_EMAIL_TIMEOUT: Duration = Duration::from_secs(15);

/// What happened to the receipt email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailDispatch {
    Sent { message_id: String },
    /// Rejected, unreachable, or slower than the email timeout.
    Failed,
}

/// Result of webhook processing.
#[derive(Debug)]
pub struct ProcessWebhookResult {
    pub outcome: ApplyOutcome,
    /// Background receipt email; `None` for replays and donors without email.
    pub email: Option<JoinHandle<EmailDispatch>>,
}

/// Handler for one gateway's webhooks.
pub struct ProcessWebhookHandler {
    gateway: WebhookGateway,
    verifier: Arc<dyn SignatureVerifier>,
    ledger: Arc<dyn DonationLedger>,
    notifier: Arc<dyn NotificationSender>,
    branding: Arc<ReceiptBranding>,
    email_timeout: Duration,
}

impl ProcessWebhookHandler {
    pub fn new(
        gateway: WebhookGateway,
        verifier: Arc<dyn SignatureVerifier>,
        ledger: Arc<dyn DonationLedger>,
        notifier: Arc<dyn NotificationSender>,
        branding: Arc<ReceiptBranding>,
    ) -> Self {
        Self {
            gateway,
            verifier,
            ledger,
            notifier,
            branding,
            email_timeout: DEFAULT_EMAIL_TIMEOUT,
        }
    }

    pub fn with_email_timeout(mut self, timeout: Duration) -> Self {
        self.email_timeout = timeout;
        self
    }

    /// Processes a delivery.
    ///
    /// Non-donation event types return `WebhookError::Ignored`, which the HTTP
    /// layer acknowledges with 200.
    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<ProcessWebhookResult, WebhookError> {
        if let Err(err) = self.verifier.verify(&cmd.payload, cmd.signature.as_deref()) {
            tracing::warn!(gateway = ?self.gateway, error = %err, "Webhook signature rejected");
            return Err(err);
        }

        let notification = self
            .gateway
            .decode(&cmd.payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let payload = match notification {
            Notification::Donation(payload) => payload,
            Notification::Ignored { event_type } => {
                tracing::info!(gateway = ?self.gateway, event_type = %event_type, "Webhook event ignored");
                return Err(WebhookError::Ignored(event_type));
            }
        };

        let event = payload.normalize()?;
        if event.amount_minor_units.is_zero() {
            tracing::warn!(
                reference = %event.reference,
                provider = %event.provider,
                "Recording donation with zero amount"
            );
        }

        let outcome = self.ledger.apply(&event).await.map_err(|err| {
            tracing::error!(
                reference = %event.reference,
                error = %err,
                retryable = err.is_retryable(),
                "Failed to record donation"
            );
            WebhookError::Ledger(err)
        })?;

        if outcome.applied {
            tracing::info!(
                reference = %outcome.record.reference,
                provider = %outcome.record.provider,
                amount_minor_units = outcome.record.amount_minor_units.value(),
                currency = %outcome.record.currency,
                "Donation recorded"
            );
        } else {
            tracing::info!(reference = %outcome.record.reference, "Duplicate delivery; ledger unchanged");
        }

        let email = self.dispatch_receipt(&outcome);

        Ok(ProcessWebhookResult { outcome, email })
    }

    fn dispatch_receipt(&self, outcome: &ApplyOutcome) -> Option<JoinHandle<EmailDispatch>> {
        if !outcome.applied {
            return None;
        }
        let to_email = outcome.record.donor_email.clone()?;

        let html = render(&outcome.record, ReceiptFormat::Html, &self.branding);
        let message = EmailMessage {
            to_email,
            to_name: outcome.record.donor_name.clone(),
            subject: self.branding.email_subject(),
            html: String::from_utf8_lossy(&html).into_owned(),
        };

        Some(tokio::spawn(send_receipt(
            self.notifier.clone(),
            message,
            outcome.record.reference.clone(),
            self.email_timeout,
        )))
    }
}

async fn send_receipt(
    notifier: Arc<dyn NotificationSender>,
    message: EmailMessage,
    reference: DonationReference,
    limit: Duration,
) -> EmailDispatch {
    match tokio::time::timeout(limit, notifier.send(&message)).await {
        Ok(Ok(message_id)) => {
            tracing::info!(reference = %reference, message_id = %message_id, "Receipt email sent");
            EmailDispatch::Sent { message_id }
        }
        Ok(Err(err)) => {
            tracing::error!(reference = %reference, error = %err, "Receipt email failed");
            EmailDispatch::Failed
        }
        Err(_) => {
            tracing::error!(
                reference = %reference,
                timeout_ms = limit.as_millis() as u64,
                "Receipt email timed out"
            );
            EmailDispatch::Failed
        }
    }
}
