pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod filter;
pub mod lookalike;
pub mod models;
pub mod profile;
pub mod record;
pub mod report;
pub mod score;
pub mod traits;

#[cfg(test)]
pub mod testutil;

pub use config::{ScoreWeights, ScoringConfig};
pub use crawl::CrawlService;
pub use error::AppError;
pub use extract::{LeadExtractor, PageDocument};
pub use filter::{UrlFilter, filter_seeds};
pub use lookalike::{LookalikeSeeds, SeenSignals};
pub use models::{CrawlTarget, FetchedPage, PlatformTag, SignalSet, SocialProfile};
pub use profile::ProfileService;
pub use record::{LeadRecord, LeadSource, PageFacts, StoredLead};
pub use report::{BatchEvent, BatchReport, BatchReporter, TracingBatchReporter};
pub use score::{Scorer, score};
pub use traits::{Fetcher, LeadStore, NullStore, ProfileSource};
