//! Brevo transactional email adapter.
//!
//! Implements the `NotificationSender` port against the Brevo SMTP API
//! (`POST /v3/smtp/email`). The API key is held as a `secrecy::SecretString`.

mod email_sender;

pub use email_sender::{BrevoConfig, BrevoEmailSender, BREVO_API_URL, DEFAULT_BREVO_TIMEOUT};
