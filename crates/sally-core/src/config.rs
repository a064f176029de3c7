//! Run-wide scoring and crawl settings.
//!
//! Loaded once from a JSON settings file before any extraction starts and
//! then shared read-only (usually behind an `Arc`). A missing weight key or an
//! invalid pattern is a [`AppError::ConfigError`] at load time.
//!
//! ```json
//! {
//!   "weights": { "email": 2, "telephone": 2, "likes": 1 },
//!   "allowed_domains": ["com", "mx"],
//!   "disallowed_domains": ["gob\\.mx"],
//!   "allowed_keywords": ["ropa", "zapatos"]
//! }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::filter::compile_domain_pattern;

/// Engagement counts below this are treated as "no engagement".
pub const DEFAULT_ENGAGEMENT_THRESHOLD: u64 = 1000;

/// Element types scanned for contact data, in priority order.
pub const DEFAULT_CONTACT_ELEMENTS: [&str; 5] = ["div", "p", "span", "a", "li"];

pub const DEFAULT_SOCIAL_NETWORKS: [&str; 3] = ["facebook.com", "instagram.com", "twitter.com"];

/// Penalty weights added by the qualification scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Added when no email was found.
    pub email: i64,
    /// Added when no phone was found.
    pub telephone: i64,
    /// Added when engagement is absent or under the threshold.
    #[serde(alias = "likes")]
    pub engagement: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,

    /// Regex-like domain fragments a seed host must match (any of).
    #[serde(default)]
    pub allowed_domains: Vec<String>,

    /// Regex-like domain fragments that exclude an otherwise allowed seed.
    #[serde(default)]
    pub disallowed_domains: Vec<String>,

    /// Vocabulary used to derive offers from meta keywords/description.
    #[serde(default)]
    pub allowed_keywords: BTreeSet<String>,

    #[serde(default = "default_social_networks")]
    pub social_networks: Vec<String>,

    #[serde(default = "default_contact_elements")]
    pub contact_elements: Vec<String>,

    #[serde(default = "default_engagement_threshold")]
    pub engagement_threshold: u64,
}

fn default_social_networks() -> Vec<String> {
    DEFAULT_SOCIAL_NETWORKS.iter().map(|s| s.to_string()).collect()
}

fn default_contact_elements() -> Vec<String> {
    DEFAULT_CONTACT_ELEMENTS.iter().map(|s| s.to_string()).collect()
}

fn default_engagement_threshold() -> u64 {
    DEFAULT_ENGAGEMENT_THRESHOLD
}

impl ScoringConfig {
    /// Config with the given weights and every other setting at its default.
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            allowed_domains: Vec::new(),
            disallowed_domains: Vec::new(),
            allowed_keywords: BTreeSet::new(),
            social_networks: default_social_networks(),
            contact_elements: default_contact_elements(),
            engagement_threshold: DEFAULT_ENGAGEMENT_THRESHOLD,
        }
    }

    pub fn with_domains(
        mut self,
        allowed: impl IntoIterator<Item = impl Into<String>>,
        disallowed: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.allowed_domains = allowed.into_iter().map(Into::into).collect();
        self.disallowed_domains = disallowed.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allowed_keywords(
        mut self,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.allowed_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Parse and validate settings from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let config: ScoringConfig = serde_json::from_str(raw)
            .map_err(|e| AppError::ConfigError(format!("Invalid settings: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON settings file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read settings file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Check every pattern and selector compiles.
    pub fn validate(&self) -> Result<(), AppError> {
        for pattern in self.allowed_domains.iter().chain(&self.disallowed_domains) {
            compile_domain_pattern(pattern)?;
        }
        if self.contact_elements.is_empty() {
            return Err(AppError::ConfigError(
                "contact_elements must name at least one element".into(),
            ));
        }
        for element in &self.contact_elements {
            Selector::parse(element).map_err(|e| {
                AppError::ConfigError(format!("Invalid contact element '{element}': {e:?}"))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_minimal_settings_get_defaults() {
        let config =
            ScoringConfig::from_json(r#"{"weights": {"email": 2, "telephone": 2, "engagement": 1}}"#)
                .unwrap();
        assert_eq!(config.weights.telephone, 2);
        assert_eq!(config.contact_elements, vec!["div", "p", "span", "a", "li"]);
        assert_eq!(config.social_networks.len(), 3);
        assert_eq!(config.engagement_threshold, 1000);
        assert!(config.allowed_domains.is_empty());
    }

    #[test]
    fn test_likes_is_accepted_for_engagement_weight() {
        let config =
            ScoringConfig::from_json(r#"{"weights": {"email": 3, "telephone": 2, "likes": 5}}"#)
                .unwrap();
        assert_eq!(config.weights.engagement, 5);
    }

    #[test]
    fn test_missing_weight_key_is_config_error() {
        let err = ScoringConfig::from_json(r#"{"weights": {"email": 3, "likes": 5}}"#).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("telephone"));
    }

    #[test]
    fn test_invalid_domain_pattern_is_config_error() {
        let err = ScoringConfig::from_json(
            r#"{"weights": {"email": 1, "telephone": 1, "engagement": 1}, "allowed_domains": ["com("]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_contact_element_is_config_error() {
        let err = ScoringConfig::from_json(
            r#"{"weights": {"email": 1, "telephone": 1, "engagement": 1}, "contact_elements": ["div", "<<"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"weights": {{"email": 2, "telephone": 2, "engagement": 1}}, "allowed_keywords": ["ropa"]}}"#
        )
        .unwrap();

        let config = ScoringConfig::from_file(file.path()).unwrap();
        assert!(config.allowed_keywords.contains("ropa"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ScoringConfig::from_file(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
