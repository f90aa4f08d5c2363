//! FetchReceiptHandler - Query handler for token-protected PDF receipts.

use std::sync::Arc;

use crate::domain::donation::ReceiptError;
use crate::domain::foundation::DonationReference;
use crate::domain::receipt::{receipt_filename, render, ReceiptBranding, ReceiptFormat};
use crate::ports::DonationLedger;

/// Query for a receipt download.
#[derive(Debug, Clone, Default)]
pub struct FetchReceiptQuery {
    pub reference: Option<String>,
    pub token: Option<String>,
}

/// A rendered PDF receipt.
#[derive(Debug, Clone)]
pub struct FetchReceiptResult {
    pub filename: String,
    pub pdf: Vec<u8>,
}

pub struct FetchReceiptHandler {
    ledger: Arc<dyn DonationLedger>,
    branding: Arc<ReceiptBranding>,
}

impl FetchReceiptHandler {
    pub fn new(ledger: Arc<dyn DonationLedger>, branding: Arc<ReceiptBranding>) -> Self {
        Self { ledger, branding }
    }

    pub async fn handle(&self, query: FetchReceiptQuery) -> Result<FetchReceiptResult, ReceiptError> {
        let reference = non_blank(query.reference).ok_or(ReceiptError::MissingParameters)?;
        let token = non_blank(query.token).ok_or(ReceiptError::MissingParameters)?;

        // A reference that cannot be stored cannot be found either.
        let reference = DonationReference::new(reference).map_err(|_| ReceiptError::NotFound)?;

        let record = self
            .ledger
            .find_by_reference(&reference)
            .await?
            .ok_or(ReceiptError::NotFound)?;

        let authorized = record
            .receipt_token
            .as_ref()
            .map(|stored| stored.matches(&token))
            .unwrap_or(false);
        if !authorized {
            tracing::warn!(reference = %reference, "Receipt requested with invalid token");
            return Err(ReceiptError::Forbidden);
        }

        Ok(FetchReceiptResult {
            filename: receipt_filename(&record),
            pdf: render(&record, ReceiptFormat::Pdf, &self.branding),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
