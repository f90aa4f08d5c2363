//! Ledger and receipt error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | LedgerError::NotFound | 404 |
//! | LedgerError::Validation | 400 |
//! | LedgerError::CampaignMissing | 500 |
//! | LedgerError::TransactionConflict | 500 |
//! | LedgerError::Storage | 500 |
//! | ReceiptError::MissingParameters | 400 |
//! | ReceiptError::Forbidden | 403 |
//! | ReceiptError::NotFound | 404 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, DonationReference, ErrorCode, ValidationError};

/// Errors raised by the donation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The campaign aggregate could not be read or created.
    #[error("Campaign '{0}' not found")]
    CampaignMissing(String),

    /// The store kept aborting the transaction; the provider should redeliver.
    #[error("Transaction conflict persisted after {attempts} attempts")]
    TransactionConflict { attempts: u32 },

    /// No donation exists under the reference.
    #[error("Donation '{0}' not found")]
    NotFound(DonationReference),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The underlying store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn storage(message: impl Into<String>) -> Self {
        LedgerError::Storage(message.into())
    }

    /// Whether a later redelivery of the same event could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::TransactionConflict { .. }
                | LedgerError::Storage(_)
                | LedgerError::CampaignMissing(_)
        )
    }
}

impl From<LedgerError> for DomainError {
    fn from(err: LedgerError) -> Self {
        let code = match &err {
            LedgerError::CampaignMissing(_) => ErrorCode::CampaignNotFound,
            LedgerError::NotFound(_) => ErrorCode::DonationNotFound,
            LedgerError::Validation(inner) => return DomainError::from(inner.clone()),
            LedgerError::TransactionConflict { .. } | LedgerError::Storage(_) => {
                ErrorCode::DatabaseError
            }
        };
        DomainError::new(code, err.to_string())
    }
}

/// Errors raised when a donor fetches a receipt.
///
/// Display strings are the plain-text response bodies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    #[error("Missing ref or token")]
    MissingParameters,

    #[error("Receipt not found")]
    NotFound,

    /// Token absent on the record or not matching.
    #[error("Invalid token")]
    Forbidden,

    #[error("Receipt unavailable: {0}")]
    Ledger(LedgerError),
}

impl From<LedgerError> for ReceiptError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(_) => ReceiptError::NotFound,
            other => ReceiptError::Ledger(other),
        }
    }
}
