//! Regional-gateway (Paystack) webhook signature verification.
//!
//! Paystack sends `x-paystack-signature: hex(HMAC-SHA512(secret_key, raw_body))`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;

use super::errors::WebhookError;
use super::{constant_time_compare, SignatureVerifier};

/// Header carrying the signature.
pub const PAYSTACK_SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Verifies Paystack webhook signatures.
pub struct PaystackSignatureVerifier {
    secret_key: SecretString,
}

impl PaystackSignatureVerifier {
    pub fn new(secret_key: SecretString) -> Self {
        Self { secret_key }
    }
}

impl SignatureVerifier for PaystackSignatureVerifier {
    fn header_name(&self) -> &'static str {
        PAYSTACK_SIGNATURE_HEADER
    }

    fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        let signature = signature.ok_or(WebhookError::MissingSignature)?;
        let provided =
            hex::decode(signature.trim()).map_err(|_| WebhookError::InvalidSignature)?;
        let expected = compute_signature(self.secret_key.expose_secret(), payload)?;

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }
}

fn compute_signature(secret: &str, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Builds a valid `x-paystack-signature` value for `payload`.
pub fn sign_paystack_payload(secret: &str, payload: &[u8]) -> String {
    compute_signature(secret, payload)
        .map(hex::encode)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "sk_test_paystack_secret";

    fn verifier() -> PaystackSignatureVerifier {
        PaystackSignatureVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    #[test]
    fn signature_is_128_hex_chars() {
        assert_eq!(sign_paystack_payload(TEST_SECRET, b"{}").len(), 128);
    }

    #[test]
    fn verify_valid_signature() {
        let payload = br#"{"event":"charge.success","data":{"reference":"ps_1"}}"#;
        let signature = sign_paystack_payload(TEST_SECRET, payload);

        assert!(verifier().verify(payload, Some(&signature)).is_ok());
    }

    #[test]
    fn verify_accepts_uppercase_hex() {
        let payload = b"{}";
        let signature = sign_paystack_payload(TEST_SECRET, payload).to_uppercase();

        assert!(verifier().verify(payload, Some(&signature)).is_ok());
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let signature = sign_paystack_payload(TEST_SECRET, br#"{"amount":100}"#);

        assert!(matches!(
            verifier().verify(br#"{"amount":999}"#, Some(&signature)),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let payload = b"{}";
        let signature = sign_paystack_payload("sk_test_other", payload);

        assert!(matches!(
            verifier().verify(payload, Some(&signature)),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_non_hex_signature_fails() {
        assert!(matches!(
            verifier().verify(b"{}", Some("zz-not-hex")),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_missing_header_fails() {
        assert!(matches!(
            verifier().verify(b"{}", None),
            Err(WebhookError::MissingSignature)
        ));
    }
}
