//! Webhook authentication for both payment gateways.
//!
//! Verifiers operate on the exact request bytes. Nothing may parse or
//! re-serialize the body before verification.

mod errors;
mod paystack_signature;
mod stripe_signature;

pub use errors::WebhookError;
pub use paystack_signature::{
    sign_paystack_payload, PaystackSignatureVerifier, PAYSTACK_SIGNATURE_HEADER,
};
pub use stripe_signature::{
    sign_stripe_payload, SignatureHeader, StripeSignatureVerifier, DEFAULT_TOLERANCE_SECS,
    STRIPE_SIGNATURE_HEADER,
};

use subtle::ConstantTimeEq;

/// Authenticates a raw webhook body against a provider signature.
pub trait SignatureVerifier: Send + Sync {
    /// Lowercase name of the header carrying the signature.
    fn header_name(&self) -> &'static str;

    /// Returns `Ok(())` only if `signature` authenticates `payload`.
    fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), WebhookError>;
}

/// Constant-time byte comparison; unequal lengths fail fast.
pub(crate) fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
