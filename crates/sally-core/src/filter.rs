use std::collections::{BTreeMap, BTreeSet};

use regex::{Regex, RegexBuilder};

use crate::config::ScoringConfig;
use crate::error::AppError;
use crate::models::CrawlTarget;

/// Compile a domain fragment into a host matcher.
///
/// The fragment is a regex matched case-insensitively right after a dot in
/// the host, so `"com"` admits `example.com` and `"gob\.mx"` admits
/// `sat.gob.mx`. Matching is unanchored at the end.
pub fn compile_domain_pattern(pattern: &str) -> Result<Regex, AppError> {
    RegexBuilder::new(&format!(r"\.{pattern}"))
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::ConfigError(format!("Invalid domain pattern '{pattern}': {e}")))
}

/// Turns seed lines into the set of crawl targets.
///
/// A seed is kept when its host matches at least one allowed pattern and none
/// of the disallowed ones. Seeds matching no allowed pattern are dropped
/// without error.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    allowed: Vec<Regex>,
    disallowed: Vec<Regex>,
}

impl UrlFilter {
    pub fn new<S: AsRef<str>>(allowed: &[S], disallowed: &[S]) -> Result<Self, AppError> {
        Ok(Self {
            allowed: compile_all(allowed)?,
            disallowed: compile_all(disallowed)?,
        })
    }

    pub fn from_config(config: &ScoringConfig) -> Result<Self, AppError> {
        Self::new(&config.allowed_domains, &config.disallowed_domains)
    }

    pub fn filter<I, S>(&self, seeds: I) -> BTreeSet<CrawlTarget>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts: BTreeMap<CrawlTarget, Option<String>> = seeds
            .into_iter()
            .filter_map(|seed| CrawlTarget::from_seed(seed.as_ref()))
            .map(|target| {
                let host = target.host();
                (target, host)
            })
            .collect();

        let matching = |pattern: &Regex, target: &CrawlTarget| {
            hosts
                .get(target)
                .and_then(Option::as_deref)
                .is_some_and(|host| pattern.is_match(host))
        };

        let mut allowed = BTreeSet::new();
        for pattern in &self.allowed {
            allowed.extend(hosts.keys().filter(|t| matching(pattern, t)).cloned());
        }

        let mut disallowed = BTreeSet::new();
        for pattern in &self.disallowed {
            disallowed.extend(allowed.iter().filter(|t| matching(pattern, t)).cloned());
        }

        tracing::debug!(
            seeds = hosts.len(),
            allowed = allowed.len(),
            disallowed = disallowed.len(),
            "Filtered seeds"
        );

        allowed.difference(&disallowed).cloned().collect()
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, AppError> {
    patterns
        .iter()
        .map(|p| compile_domain_pattern(p.as_ref()))
        .collect()
}

/// One-shot form of [`UrlFilter::filter`].
pub fn filter_seeds<I, S, P>(
    seeds: I,
    allowed: &[P],
    disallowed: &[P],
) -> Result<BTreeSet<CrawlTarget>, AppError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    P: AsRef<str>,
{
    Ok(UrlFilter::new(allowed, disallowed)?.filter(seeds))
}
