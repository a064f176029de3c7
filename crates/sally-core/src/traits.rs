use std::future::Future;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{CrawlTarget, FetchedPage, SocialProfile};
use crate::record::{LeadRecord, StoredLead};

/// Fetches a crawl target and returns the page after redirects.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(
        &self,
        target: &CrawlTarget,
    ) -> impl Future<Output = Result<FetchedPage, AppError>> + Send;
}

/// Looks up a social profile by id on a hosted graph API.
pub trait ProfileSource: Send + Sync + Clone {
    /// Returns the flat profile payload, or [`AppError::UpstreamError`] when
    /// the remote API answers with an error object.
    fn profile(
        &self,
        profile_id: &str,
    ) -> impl Future<Output = Result<SocialProfile, AppError>> + Send;
}

/// Persists and retrieves lead records.
pub trait LeadStore: Send + Sync + Clone {
    /// Save a lead record. Returns the generated UUID.
    fn save(&self, record: &LeadRecord) -> impl Future<Output = Result<Uuid, AppError>> + Send;

    /// Most recently saved leads, newest first.
    fn recent(&self, limit: usize)
    -> impl Future<Output = Result<Vec<StoredLead>, AppError>> + Send;

    /// Every saved lead for a website, newest first.
    fn history(
        &self,
        website: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<StoredLead>, AppError>> + Send;
}

/// A no-op LeadStore for use when persistence is not needed.
#[derive(Debug, Clone)]
pub struct NullStore;

impl LeadStore for NullStore {
    async fn save(&self, _record: &LeadRecord) -> Result<Uuid, AppError> {
        Ok(Uuid::nil())
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<StoredLead>, AppError> {
        Ok(vec![])
    }

    async fn history(&self, _website: &str, _limit: usize) -> Result<Vec<StoredLead>, AppError> {
        Ok(vec![])
    }
}
