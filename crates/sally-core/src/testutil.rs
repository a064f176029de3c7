//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{CrawlTarget, FetchedPage, SocialProfile};
use crate::record::{LeadRecord, StoredLead};
use crate::report::{BatchEvent, BatchReporter};
use crate::traits::{Fetcher, LeadStore, ProfileSource};

pub const DEFAULT_HTML: &str = "<html><head><title>Default</title></head><body></body></html>";

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher with per-URL responses.
///
/// Each configured response is served once; unknown URLs get [`DEFAULT_HTML`].
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, Result<FetchedPage, AppError>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_redirect(url, url, html)
    }

    pub fn with_redirect(self, url: &str, final_url: &str, html: &str) -> Self {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            Ok(FetchedPage {
                final_url: final_url.to_string(),
                html: html.to_string(),
            }),
        );
        self
    }

    pub fn with_error(self, url: &str, error: AppError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, target: &CrawlTarget) -> Result<FetchedPage, AppError> {
        self.calls.lock().unwrap().push(target.to_string());
        let response = self.responses.lock().unwrap().remove(target.as_str());
        response.unwrap_or_else(|| {
            Ok(FetchedPage {
                final_url: target.to_string(),
                html: DEFAULT_HTML.to_string(),
            })
        })
    }
}

// ---------------------------------------------------------------------------
// MockProfileSource
// ---------------------------------------------------------------------------

/// Mock graph API. Unknown ids answer with an upstream error.
#[derive(Clone, Default)]
pub struct MockProfileSource {
    profiles: Arc<Mutex<HashMap<String, Result<SocialProfile, AppError>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, id: &str, profile: SocialProfile) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .insert(id.to_string(), Ok(profile));
        self
    }

    pub fn with_error(self, id: &str, error: AppError) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .insert(id.to_string(), Err(error));
        self
    }
}

impl ProfileSource for MockProfileSource {
    async fn profile(&self, profile_id: &str) -> Result<SocialProfile, AppError> {
        self.calls.lock().unwrap().push(profile_id.to_string());
        self.profiles
            .lock()
            .unwrap()
            .remove(profile_id)
            .unwrap_or_else(|| {
                Err(AppError::upstream(
                    "graph",
                    format!("Unsupported get request. Object with ID '{profile_id}' does not exist"),
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// Mock store that records saved leads.
#[derive(Clone, Default)]
pub struct MockStore {
    pub saved: Arc<Mutex<Vec<StoredLead>>>,
    save_error: Arc<Mutex<Option<AppError>>>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fails the next save with `error`.
    pub fn with_save_error(error: AppError) -> Self {
        Self {
            saved: Arc::default(),
            save_error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl LeadStore for MockStore {
    async fn save(&self, record: &LeadRecord) -> Result<Uuid, AppError> {
        if let Some(e) = self.save_error.lock().unwrap().take() {
            return Err(e);
        }
        let id = Uuid::new_v4();
        self.saved.lock().unwrap().push(StoredLead {
            id,
            record: record.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredLead>, AppError> {
        let saved = self.saved.lock().unwrap();
        Ok(saved.iter().rev().take(limit).cloned().collect())
    }

    async fn history(&self, website: &str, limit: usize) -> Result<Vec<StoredLead>, AppError> {
        let saved = self.saved.lock().unwrap();
        Ok(saved
            .iter()
            .rev()
            .filter(|lead| lead.record.website.as_deref() == Some(website))
            .take(limit)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Reporter that records a short label per event.
#[derive(Clone, Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.labels()
            .iter()
            .filter(|label| label.starts_with(prefix))
            .count()
    }
}

impl BatchReporter for MockReporter {
    fn report(&self, event: BatchEvent<'_>) {
        let label = match event {
            BatchEvent::Started { pipeline, total } => format!("started:{pipeline}:{total}"),
            BatchEvent::ItemStarted { item } => format!("item_started:{item}"),
            BatchEvent::LeadBuilt { item, score } => format!("lead:{item}:{score}"),
            BatchEvent::ItemFailed { item, .. } => format!("failed:{item}"),
            BatchEvent::ItemSkipped { item, .. } => format!("skipped:{item}"),
            BatchEvent::Cancelled { pending } => format!("cancelled:{pending}"),
            BatchEvent::Completed {
                succeeded, failed, ..
            } => format!("completed:{succeeded}:{failed}"),
        };
        self.events.lock().unwrap().push(label);
    }
}
