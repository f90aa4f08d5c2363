//! Canonical donation event produced by every provider normalizer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Currency, DonationReference, MinorUnits};

use super::DonationProvider;

/// Donor name used when no provider field carries one.
pub const ANONYMOUS_DONOR: &str = "Anonymous";

/// A completed payment, independent of which gateway reported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationEvent {
    pub provider: DonationProvider,
    pub amount_minor_units: MinorUnits,
    pub currency: Currency,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub reference: DonationReference,
}

impl DonationEvent {
    /// True when the event carries a real donor name rather than the placeholder.
    pub fn has_named_donor(&self) -> bool {
        self.donor_name != ANONYMOUS_DONOR
    }
}

/// Returns the first candidate that is present and not blank, trimmed.
pub(crate) fn first_present<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_present_skips_missing_and_blank() {
        let picked = first_present([None, Some("   "), Some(" Jane "), Some("John")]);
        assert_eq!(picked.as_deref(), Some("Jane"));
    }

    #[test]
    fn first_present_returns_none_when_all_blank() {
        assert_eq!(first_present([None, Some("")]), None);
    }
}
