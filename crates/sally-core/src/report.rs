use crate::lookalike::LookalikeSeeds;
use crate::record::LeadRecord;

/// Events emitted while a batch runs, for monitoring/logging.
#[derive(Debug, Clone)]
pub enum BatchEvent<'a> {
    Started {
        pipeline: &'a str,
        total: usize,
    },
    ItemStarted {
        item: &'a str,
    },
    LeadBuilt {
        item: &'a str,
        score: i64,
    },
    ItemFailed {
        item: &'a str,
        error: &'a str,
    },
    ItemSkipped {
        item: &'a str,
        reason: &'a str,
    },
    Cancelled {
        pending: usize,
    },
    /// Emitted once after every item, including any lookalike follow-up.
    Completed {
        pipeline: &'a str,
        succeeded: usize,
        failed: usize,
        seen: &'a LookalikeSeeds,
    },
}

/// Trait for receiving batch events (decoupled logging).
pub trait BatchReporter: Send + Sync {
    fn report(&self, event: BatchEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBatchReporter;

impl BatchReporter for TracingBatchReporter {
    fn report(&self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::Started { pipeline, total } => {
                tracing::info!(%pipeline, %total, "Batch started");
            }
            BatchEvent::ItemStarted { item } => {
                tracing::debug!(%item, "Processing");
            }
            BatchEvent::LeadBuilt { item, score } => {
                tracing::info!(%item, %score, "Lead built");
            }
            BatchEvent::ItemFailed { item, error } => {
                tracing::warn!(%item, %error, "Skipping after failure");
            }
            BatchEvent::ItemSkipped { item, reason } => {
                tracing::debug!(%item, %reason, "Skipped");
            }
            BatchEvent::Cancelled { pending } => {
                tracing::info!(%pending, "Batch cancelled, no new items scheduled");
            }
            BatchEvent::Completed {
                pipeline,
                succeeded,
                failed,
                seen,
            } => {
                tracing::info!(
                    %pipeline,
                    %succeeded,
                    %failed,
                    categories = ?seen.categories,
                    social_networks = ?seen.social_networks,
                    "Batch completed"
                );
            }
        }
    }
}

/// A target or profile that produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub item: String,
    pub error: String,
}

/// Outcome of a whole batch: one record per success, one failure per skip.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub records: Vec<LeadRecord>,
    pub failures: Vec<BatchFailure>,
    /// Items never started because the batch was cancelled.
    pub pending: usize,
    pub seen: LookalikeSeeds,
}

impl BatchReport {
    pub fn was_cancelled(&self) -> bool {
        self.pending > 0
    }
}
