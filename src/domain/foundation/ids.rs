//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Provider-assigned reference for one completed transaction.
///
/// This is the primary key of a donation record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonationReference(String);

impl DonationReference {
    /// Creates a reference, rejecting blank input.
    pub fn new(reference: impl Into<String>) -> Result<Self, ValidationError> {
        let reference = reference.into().trim().to_string();
        if reference.is_empty() {
            return Err(ValidationError::empty_field("reference"));
        }
        Ok(Self(reference))
    }

    /// Generates a reference for a manually recorded donation.
    pub fn manual() -> Self {
        Self(format!("manual_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem and header safe form used in download filenames.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for DonationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditEntryId(Uuid);

impl AuditEntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AuditEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuditEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_trimmed() {
        let reference = DonationReference::new("  cs_test_1 ").unwrap();
        assert_eq!(reference.as_str(), "cs_test_1");
    }

    #[test]
    fn blank_reference_is_rejected() {
        assert!(DonationReference::new("   ").is_err());
    }

    #[test]
    fn manual_references_are_prefixed_and_unique() {
        let a = DonationReference::manual();
        let b = DonationReference::manual();
        assert!(a.as_str().starts_with("manual_"));
        assert_ne!(a, b);
    }

    #[test]
    fn file_stem_replaces_unsafe_characters() {
        let reference = DonationReference::new("ref/../\"x\" 1").unwrap();
        assert_eq!(reference.file_stem(), "ref_____x__1");
    }
}
