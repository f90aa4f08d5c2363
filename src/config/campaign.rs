//! Campaign and receipt branding configuration

use serde::Deserialize;

use crate::domain::donation::{DEFAULT_CAMPAIGN_ID, DEFAULT_GOAL_MINOR_UNITS};
use crate::domain::foundation::MinorUnits;
use crate::domain::receipt::ReceiptBranding;

use super::error::ValidationError;

/// Campaign configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignConfig {
    /// Aggregate row id
    #[serde(default = "default_id")]
    pub id: String,

    /// Target amount, minor units
    #[serde(default = "default_goal")]
    pub goal_minor_units: u64,

    /// Organisation name printed on receipts
    #[serde(default = "default_ministry_name")]
    pub ministry_name: String,

    /// Campaign title printed on receipts
    #[serde(default = "default_title")]
    pub title: String,

    /// Public origin used in receipt download links
    #[serde(default)]
    pub public_base_url: String,
}

impl CampaignConfig {
    pub fn goal(&self) -> MinorUnits {
        MinorUnits::new(self.goal_minor_units)
    }

    pub fn branding(&self) -> ReceiptBranding {
        ReceiptBranding {
            ministry_name: self.ministry_name.clone(),
            campaign_title: self.title.clone(),
            public_base_url: self.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Validate campaign configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("CAMPAIGN__ID"));
        }
        if self.public_base_url.is_empty() {
            return Err(ValidationError::MissingRequired("CAMPAIGN__PUBLIC_BASE_URL"));
        }
        if !self.public_base_url.starts_with("https://")
            && !self.public_base_url.starts_with("http://")
        {
            return Err(ValidationError::InvalidPublicBaseUrl);
        }
        Ok(())
    }
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            goal_minor_units: default_goal(),
            ministry_name: default_ministry_name(),
            title: default_title(),
            public_base_url: String::new(),
        }
    }
}

fn default_id() -> String {
    DEFAULT_CAMPAIGN_ID.to_string()
}

fn default_goal() -> u64 {
    DEFAULT_GOAL_MINOR_UNITS
}

fn default_ministry_name() -> String {
    "Life Gate Ministries Worldwide".to_string()
}

fn default_title() -> String {
    "Life Gate Ministries Campaign".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CampaignConfig::default();
        assert_eq!(config.id, "global");
        assert_eq!(config.goal(), MinorUnits::new(100_000_000));
    }

    #[test]
    fn test_public_base_url_required() {
        assert_eq!(
            CampaignConfig::default().validate(),
            Err(ValidationError::MissingRequired("CAMPAIGN__PUBLIC_BASE_URL"))
        );
    }

    #[test]
    fn test_relative_base_url_rejected() {
        let config = CampaignConfig {
            public_base_url: "give.example.org".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPublicBaseUrl));
    }

    #[test]
    fn test_branding_strips_trailing_slash() {
        let config = CampaignConfig {
            public_base_url: "https://give.example.org/".to_string(),
            ..Default::default()
        };
        let branding = config.branding();
        assert_eq!(branding.public_base_url, "https://give.example.org");
        assert_eq!(branding.ministry_name, "Life Gate Ministries Worldwide");
    }
}
