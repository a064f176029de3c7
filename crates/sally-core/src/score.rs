//! Lead qualification scoring.
//!
//! The score is a penalty-for-absence sum: it starts at 1 and grows with every
//! missing contact channel and with weak engagement. A lower score therefore
//! means a richer, easier-to-reach lead. Read it as outreach priority, not as
//! lead quality.

use crate::config::{DEFAULT_ENGAGEMENT_THRESHOLD, ScoreWeights, ScoringConfig};
use crate::models::{SignalSet, SocialProfile};

pub const BASE_SCORE: i64 = 1;

/// The presence signals the scorer looks at, common to both pipelines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactSignals {
    pub has_email: bool,
    pub has_phone: bool,
    pub engagement: Option<u64>,
}

impl From<&SignalSet> for ContactSignals {
    fn from(signals: &SignalSet) -> Self {
        Self {
            has_email: !signals.emails.is_empty(),
            has_phone: !signals.phones.is_empty(),
            engagement: signals.engagement,
        }
    }
}

impl From<&SocialProfile> for ContactSignals {
    fn from(profile: &SocialProfile) -> Self {
        Self {
            has_email: profile.has_emails(),
            has_phone: profile.has_phone(),
            engagement: profile.engagement_count(),
        }
    }
}

/// Scores contact signals against a set of weights.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    weights: ScoreWeights,
    engagement_threshold: u64,
}

impl Scorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            engagement_threshold: DEFAULT_ENGAGEMENT_THRESHOLD,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            weights: config.weights,
            engagement_threshold: config.engagement_threshold,
        }
    }

    pub fn score(&self, signals: impl Into<ContactSignals>) -> i64 {
        let signals = signals.into();
        let low_engagement = signals
            .engagement
            .is_none_or(|count| count < self.engagement_threshold);

        // Weights are unchecked settings values.
        [
            (!signals.has_email, self.weights.email),
            (!signals.has_phone, self.weights.telephone),
            (low_engagement, self.weights.engagement),
        ]
        .into_iter()
        .filter(|(missing, _)| *missing)
        .fold(BASE_SCORE, |score, (_, weight)| score.saturating_add(weight))
    }
}

/// Score with the default engagement threshold.
pub fn score(signals: impl Into<ContactSignals>, weights: &ScoreWeights) -> i64 {
    Scorer::new(*weights).score(signals)
}
