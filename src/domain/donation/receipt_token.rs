//! Receipt tokens: bearer secrets that authorize receipt downloads.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Random bytes per token; hex encoding doubles the length.
pub const RECEIPT_TOKEN_BYTES: usize = 24;

/// Opaque secret bound to one donation reference.
///
/// Issued once when the donation is first recorded and never regenerated,
/// so links in already-sent emails keep working.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptToken(String);

impl ReceiptToken {
    /// Issues a fresh token from the OS CSPRNG.
    pub fn issue() -> Self {
        let mut bytes = [0u8; RECEIPT_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wraps a token loaded from storage.
    pub fn from_stored(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a caller-supplied token.
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let provided = candidate.as_bytes();
        if expected.len() != provided.len() {
            return false;
        }
        expected.ct_eq(provided).into()
    }
}

// Tokens are secrets; keep them out of logs.
impl fmt::Debug for ReceiptToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReceiptToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_is_48_lowercase_hex_chars() {
        let token = ReceiptToken::issue();
        assert_eq!(token.as_str().len(), 48);
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn issued_tokens_differ() {
        assert_ne!(ReceiptToken::issue(), ReceiptToken::issue());
    }

    #[test]
    fn matches_exact_token_only() {
        let token = ReceiptToken::from_stored("abc123");
        assert!(token.matches("abc123"));
        assert!(!token.matches("abc124"));
        assert!(!token.matches("abc12"));
        assert!(!token.matches(""));
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = ReceiptToken::from_stored("supersecret");
        assert!(!format!("{:?}", token).contains("supersecret"));
    }
}
