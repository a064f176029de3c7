use std::time::Duration;

use reqwest::Client;
use sally_core::error::AppError;
use sally_core::models::{CrawlTarget, FetchedPage};
use sally_core::traits::Fetcher;

const DEFAULT_USER_AGENT: &str = "Sally/0.1 (lead crawler)";
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP fetcher using reqwest.
///
/// Downloads raw HTML with a configurable User-Agent and timeout, following
/// redirects. The returned page carries the URL the body was served from.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Self::build(DEFAULT_USER_AGENT, timeout)
    }

    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Result<Self, AppError> {
        Self::build(user_agent, timeout)
    }

    fn build(user_agent: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, target: &CrawlTarget) -> Result<FetchedPage, AppError> {
        let response = self
            .client
            .get(target.as_str())
            .send()
            .await
            .map_err(|e| map_request_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                target
            )));
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        Ok(FetchedPage { final_url, html })
    }
}

/// Classify a reqwest failure into the matching [`AppError`].
pub(crate) fn map_request_error(e: reqwest::Error, timeout_secs: u64) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout_secs)
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {e}"))
    } else {
        AppError::HttpError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_defaults() {
        let fetcher = ReqwestFetcher::new().unwrap();
        assert_eq!(fetcher.timeout_secs, 30);
    }

    #[test]
    fn test_custom_user_agent() {
        let fetcher =
            ReqwestFetcher::with_user_agent("Mozilla/5.0 (compatible)", Duration::from_secs(5))
                .unwrap();
        assert_eq!(fetcher.timeout_secs, 5);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(5)).unwrap();
        // Nothing listens on the discard port.
        let target = CrawlTarget::from_seed("http://127.0.0.1:9").unwrap();
        let err = fetcher.fetch(&target).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::NetworkError(_) | AppError::HttpError(_)
        ));
    }
}
