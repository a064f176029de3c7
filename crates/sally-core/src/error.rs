use thiserror::Error;

/// Application-wide error types for Sally.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page or a profile).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A remote collaborator answered with an error payload.
    #[error("Upstream error from {service}: {message}")]
    UpstreamError { service: String, message: String },

    /// Settings are missing or invalid. Fatal at load time.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if the error must stop the run instead of skipping one target.
    ///
    /// Only configuration problems qualify: every scored record depends on them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::ConfigError(_))
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::UpstreamError {
            service: service.into(),
            message: message.into(),
        }
    }
}
