use std::time::Duration;

use reqwest::Client;
use sally_core::error::AppError;
use sally_core::models::SocialProfile;
use sally_core::traits::ProfileSource;
use serde::Deserialize;
use url::Url;

use crate::fetcher::map_request_error;

const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";
const DEFAULT_GRAPH_TIMEOUT: Duration = Duration::from_secs(30);
const SERVICE: &str = "graph";

/// Page fields requested for every profile.
pub const PROFILE_FIELDS: [&str; 19] = [
    "about",
    "category",
    "contact_address",
    "engagement",
    "emails",
    "location",
    "phone",
    "website",
    "category_list",
    "description",
    "has_whatsapp_number",
    "whatsapp_number",
    "hometown",
    "name",
    "products",
    "rating_count",
    "overall_star_rating",
    "link",
    "connected_instagram_account",
];

/// Client for the hosted graph API that serves social page profiles.
#[derive(Clone)]
pub struct GraphProfileClient {
    client: Client,
    base_url: String,
    access_token: String,
    timeout_secs: u64,
}

impl GraphProfileClient {
    pub fn new(access_token: &str) -> Result<Self, AppError> {
        Self::with_base_url(access_token, DEFAULT_GRAPH_URL)
    }

    pub fn with_base_url(access_token: &str, base_url: &str) -> Result<Self, AppError> {
        Self::build(access_token, base_url, DEFAULT_GRAPH_TIMEOUT)
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, AppError> {
        Self::build(&self.access_token, &self.base_url, timeout)
    }

    fn build(access_token: &str, base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        if access_token.trim().is_empty() {
            return Err(AppError::ConfigError(
                "Graph API access token is empty".into(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Request URL for a profile id, token included.
    pub fn profile_url(&self, profile_id: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid graph URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| AppError::ConfigError("Graph URL cannot be a base".into()))?
            .pop_if_empty()
            .push(profile_id);
        url.query_pairs_mut()
            .append_pair("fields", &PROFILE_FIELDS.join(","))
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

/// Turn a graph API response body into a profile.
///
/// A body carrying an `error` object becomes [`AppError::UpstreamError`].
pub fn parse_profile_payload(body: &str) -> Result<SocialProfile, AppError> {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        let message = match api_error.error.code {
            Some(code) => format!("{} (code {code})", api_error.error.message),
            None => api_error.error.message,
        };
        return Err(AppError::upstream(SERVICE, message));
    }
    Ok(serde_json::from_str(body)?)
}

impl ProfileSource for GraphProfileClient {
    async fn profile(&self, profile_id: &str) -> Result<SocialProfile, AppError> {
        let url = self.profile_url(profile_id)?;
        tracing::debug!(%profile_id, "Requesting graph profile");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error(e, self.timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read graph response: {e}")))?;

        match parse_profile_payload(&body) {
            Err(AppError::SerializationError(_)) if !status.is_success() => Err(
                AppError::HttpError(format!("HTTP {} for profile {profile_id}", status.as_u16())),
            ),
            result => result,
        }
    }
}
