use std::future;
use std::sync::Arc;

use chrono::Utc;
use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::config::ScoringConfig;
use crate::error::AppError;
use crate::extract::LeadExtractor;
use crate::lookalike::SeenSignals;
use crate::models::CrawlTarget;
use crate::record::LeadRecord;
use crate::report::{BatchEvent, BatchFailure, BatchReport, BatchReporter};
use crate::score::Scorer;
use crate::traits::{Fetcher, LeadStore};

pub const DEFAULT_CONCURRENCY: usize = 8;

/// Orchestrates the web pipeline: fetch → extract → score → build → save.
///
/// Generic over the fetcher and the store via traits, so tests run without
/// real HTTP or a database.
pub struct CrawlService<F, S>
where
    F: Fetcher,
    S: LeadStore,
{
    fetcher: F,
    extractor: LeadExtractor,
    scorer: Scorer,
    store: Option<S>,
    seen: Arc<SeenSignals>,
}

impl<F, S> CrawlService<F, S>
where
    F: Fetcher,
    S: LeadStore,
{
    /// Create a new CrawlService without persistence.
    pub fn new(fetcher: F, config: Arc<ScoringConfig>) -> Result<Self, AppError> {
        Ok(Self {
            fetcher,
            scorer: Scorer::from_config(&config),
            extractor: LeadExtractor::new(config)?,
            store: None,
            seen: Arc::new(SeenSignals::new()),
        })
    }

    /// Create a new CrawlService with database persistence.
    pub fn with_store(fetcher: F, store: S, config: Arc<ScoringConfig>) -> Result<Self, AppError> {
        let mut service = Self::new(fetcher, config)?;
        service.store = Some(store);
        Ok(service)
    }

    /// Share a lookalike accumulator with another pipeline.
    pub fn with_seen(mut self, seen: Arc<SeenSignals>) -> Self {
        self.seen = seen;
        self
    }

    pub fn seen(&self) -> &SeenSignals {
        &self.seen
    }

    /// Run the web pipeline for one target.
    ///
    /// The page is parsed and dropped before any further await, so the
    /// returned future stays `Send`.
    pub async fn process_target(&self, target: &CrawlTarget) -> Result<LeadRecord, AppError> {
        tracing::info!(url = %target, "Fetching");
        let page = self.fetcher.fetch(target).await?;
        tracing::debug!(url = %target, final_url = %page.final_url, bytes = page.html.len(), "Fetched");

        let signals = self.extractor.extract_html(&page.final_url, &page.html);
        self.seen.record_page(&signals);

        let score = self.scorer.score(&signals);
        let record = LeadRecord::from_signals(&signals, score, target.as_str(), Utc::now());

        if let Some(store) = &self.store {
            let id = store.save(&record).await?;
            tracing::info!(%id, url = %target, "Lead saved");
        }

        Ok(record)
    }

    /// Process every target with at most `concurrency` in flight.
    ///
    /// A failing target is reported and skipped. Cancelling `cancel` stops
    /// scheduling new targets; targets already in flight finish.
    pub async fn run_batch<R: BatchReporter>(
        &self,
        targets: &[CrawlTarget],
        concurrency: usize,
        cancel: &CancellationToken,
        reporter: &R,
    ) -> BatchReport {
        reporter.report(BatchEvent::Started {
            pipeline: "crawl",
            total: targets.len(),
        });

        let mut report = BatchReport::default();
        let mut finished = 0;

        let mut results = stream::iter(targets)
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|target| async move {
                reporter.report(BatchEvent::ItemStarted {
                    item: target.as_str(),
                });
                (target, self.process_target(target).await)
            })
            .buffer_unordered(concurrency.max(1));

        while let Some((target, result)) = results.next().await {
            finished += 1;
            match result {
                Ok(record) => {
                    reporter.report(BatchEvent::LeadBuilt {
                        item: target.as_str(),
                        score: record.score,
                    });
                    report.records.push(record);
                }
                Err(e) => {
                    let error = e.to_string();
                    reporter.report(BatchEvent::ItemFailed {
                        item: target.as_str(),
                        error: &error,
                    });
                    if e.is_fatal() {
                        cancel.cancel();
                    }
                    report.failures.push(BatchFailure {
                        item: target.to_string(),
                        error,
                    });
                }
            }
        }

        report.pending = targets.len() - finished;
        if report.pending > 0 {
            reporter.report(BatchEvent::Cancelled {
                pending: report.pending,
            });
        }

        report.seen = self.seen.snapshot();
        reporter.report(BatchEvent::Completed {
            pipeline: "crawl",
            succeeded: report.records.len(),
            failed: report.failures.len(),
            seen: &report.seen,
        });

        report
    }
}
