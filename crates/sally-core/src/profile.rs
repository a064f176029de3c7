//! Social-profile pipeline: seed links → graph API → scored lead records.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ScoringConfig;
use crate::error::AppError;
use crate::lookalike::SeenSignals;
use crate::record::LeadRecord;
use crate::report::{BatchEvent, BatchFailure, BatchReport, BatchReporter};
use crate::score::Scorer;
use crate::traits::{LeadStore, ProfileSource};

/// Pause between graph API calls used by the CLI unless overridden.
pub const DEFAULT_PROFILE_DELAY: Duration = Duration::from_secs(3);

/// Profile id of a Facebook page link: the first path segment.
///
/// `https://www.facebook.com/tacosdonpepe/?ref=bookmarks` yields
/// `tacosdonpepe`. Links without a scheme are accepted.
pub fn profile_id_from_seed(seed: &str) -> Option<String> {
    let seed = seed.trim();
    if seed.is_empty() {
        return None;
    }
    let url = if seed.contains("://") {
        Url::parse(seed)
    } else {
        Url::parse(&format!("https://{seed}"))
    }
    .ok()?;

    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Split seed lines into profile links.
///
/// Lines are joined and re-split on commas so one line may carry several
/// links. Only entries mentioning `facebook` are kept.
pub fn profile_entries<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .collect::<Vec<_>>()
        .join(",");

    joined
        .split(',')
        .map(str::trim)
        .filter(|entry| entry.to_lowercase().contains("facebook"))
        .map(str::to_string)
        .collect()
}

/// Orchestrates the social-profile pipeline: lookup → score → build → save.
pub struct ProfileService<P, S>
where
    P: ProfileSource,
    S: LeadStore,
{
    source: P,
    scorer: Scorer,
    store: Option<S>,
    seen: Arc<SeenSignals>,
    delay: Option<Duration>,
}

impl<P, S> ProfileService<P, S>
where
    P: ProfileSource,
    S: LeadStore,
{
    /// Create a new ProfileService without persistence.
    pub fn new(source: P, config: &ScoringConfig) -> Self {
        Self {
            source,
            scorer: Scorer::from_config(config),
            store: None,
            seen: Arc::new(SeenSignals::new()),
            delay: None,
        }
    }

    /// Create a new ProfileService with database persistence.
    pub fn with_store(source: P, store: S, config: &ScoringConfig) -> Self {
        Self {
            store: Some(store),
            ..Self::new(source, config)
        }
    }

    /// Wait `delay` between consecutive lookups.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = (!delay.is_zero()).then_some(delay);
        self
    }

    pub fn with_seen(mut self, seen: Arc<SeenSignals>) -> Self {
        self.seen = seen;
        self
    }

    pub fn seen(&self) -> &SeenSignals {
        &self.seen
    }

    /// Look up one profile and turn it into a lead record.
    pub async fn process_profile(&self, profile_id: &str) -> Result<LeadRecord, AppError> {
        tracing::info!(%profile_id, "Fetching profile");
        let profile = self.source.profile(profile_id).await?;
        self.seen.record_profile(&profile);

        let mut record = LeadRecord::from_profile(&profile, self.scorer.score(&profile), Utc::now());
        if record.website.is_none() {
            record.website = Some(format!("https://www.facebook.com/{profile_id}"));
        }

        if let Some(store) = &self.store {
            let id = store.save(&record).await?;
            tracing::info!(%id, %profile_id, "Lead saved");
        }

        Ok(record)
    }

    /// Look up every profile linked from `lines`, one at a time.
    ///
    /// Upstream errors are reported and skipped. Cancelling `cancel` stops
    /// before the next lookup, including during the inter-call delay.
    pub async fn run_batch<I, T, R>(
        &self,
        lines: I,
        cancel: &CancellationToken,
        reporter: &R,
    ) -> BatchReport
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
        R: BatchReporter,
    {
        let entries = profile_entries(lines);
        reporter.report(BatchEvent::Started {
            pipeline: "profiles",
            total: entries.len(),
        });

        let mut report = BatchReport::default();
        let mut started = 0;

        for entry in &entries {
            if cancel.is_cancelled() {
                break;
            }
            let Some(profile_id) = profile_id_from_seed(entry) else {
                started += 1;
                reporter.report(BatchEvent::ItemSkipped {
                    item: entry,
                    reason: "no profile id in link",
                });
                continue;
            };

            if let Some(delay) = self.delay.filter(|_| started > 0) {
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = cancel.cancelled() => break,
                }
            }

            started += 1;
            reporter.report(BatchEvent::ItemStarted { item: &profile_id });
            match self.process_profile(&profile_id).await {
                Ok(record) => {
                    reporter.report(BatchEvent::LeadBuilt {
                        item: &profile_id,
                        score: record.score,
                    });
                    report.records.push(record);
                }
                Err(e) => {
                    let error = e.to_string();
                    reporter.report(BatchEvent::ItemFailed {
                        item: &profile_id,
                        error: &error,
                    });
                    if e.is_fatal() {
                        cancel.cancel();
                    }
                    report.failures.push(BatchFailure {
                        item: profile_id,
                        error,
                    });
                }
            }
        }

        report.pending = entries.len() - started;
        if report.pending > 0 {
            reporter.report(BatchEvent::Cancelled {
                pending: report.pending,
            });
        }

        report.seen = self.seen.snapshot();
        reporter.report(BatchEvent::Completed {
            pipeline: "profiles",
            succeeded: report.records.len(),
            failed: report.failures.len(),
            seen: &report.seen,
        });

        report
    }
}
