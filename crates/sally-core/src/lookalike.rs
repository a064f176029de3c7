//! Accumulates what a batch has seen, to seed a lookalike search later.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use url::Url;

use crate::models::{SignalSet, SocialProfile};

/// Categories and social network hosts observed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookalikeSeeds {
    pub categories: BTreeSet<String>,
    pub social_networks: BTreeSet<String>,
}

impl LookalikeSeeds {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.social_networks.is_empty()
    }
}

/// Shared accumulator, safe to record into from concurrent workers.
///
/// Each record call merges under one lock, so concurrent updates are never lost.
#[derive(Debug, Default)]
pub struct SeenSignals {
    inner: Mutex<LookalikeSeeds>,
}

impl SeenSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&self, signals: &SignalSet) {
        let networks: Vec<String> = signals
            .social_links
            .iter()
            .filter_map(|link| network_host(link))
            .collect();

        let mut seen = self.lock();
        seen.categories.extend(signals.offers.iter().cloned());
        seen.social_networks.extend(networks);
    }

    pub fn record_profile(&self, profile: &SocialProfile) {
        let category = profile
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let network = profile.link.as_deref().and_then(network_host);

        let mut seen = self.lock();
        seen.categories.extend(category);
        seen.social_networks.extend(network);
    }

    pub fn snapshot(&self) -> LookalikeSeeds {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, LookalikeSeeds> {
        // Writers only extend sets, so a poisoned lock still holds usable data.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Host of a social link without a leading `www.`.
fn network_host(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}
