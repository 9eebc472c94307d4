//! Error types for audit operations.
//!
//! This module defines the main error type [`AuditError`] and the nested
//! [`FetchError`], whose messages are shown to users verbatim when a page
//! cannot be retrieved.
//!
//! # Example
//!
//! ```rust
//! use aeo_audit_core::{AuditError, Result};
//!
//! fn require_key(key: Option<&str>) -> Result<&str> {
//!     key.filter(|k| !k.is_empty())
//!         .ok_or_else(|| AuditError::MissingCredential("OpenAI API key not provided".to_string()))
//! }
//! # assert!(require_key(None).is_err());
//! ```

use thiserror::Error;

/// Failures while retrieving a page.
///
/// The `Display` text of each variant is the message placed on a failure
/// record, so it is written for end users rather than for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The page did not respond within the configured timeout.
    #[error("Request timed out. The page took too long to respond.")]
    Timeout { timeout: u64 },

    /// DNS failure, refused connection, TLS failure and similar.
    #[error("Could not connect to the URL. Please check if it's valid.")]
    Connect,

    /// The server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(u16),

    /// Anything else, including malformed URLs and body decoding errors.
    #[error("Error fetching page: {0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { timeout: 0 }
        } else if err.is_connect() {
            FetchError::Connect
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Other(err.to_string())
        }
    }
}

/// Main error type for audit operations.
///
/// Covers page retrieval, HTML handling and the optional LLM-backed
/// providers (query generation, citation checks, recommendations).
#[derive(Error, Debug)]
pub enum AuditError {
    /// The page could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid CSS selector or unusable markup.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// A provider was asked to run without its API key.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Provider call exceeded its timeout.
    #[error("Request timed out")]
    ProviderTimeout,

    /// Provider rejected the credential (HTTP 401).
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Provider throttled the request (HTTP 429).
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Provider answered with another non-success status.
    #[error("API error: {0}")]
    ApiStatus(u16),

    /// Transport-level provider failure.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Provider body did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    MalformedResponse(String),

    /// The query provider produced fewer than three usable queries.
    #[error("LLM returned fewer than 3 queries")]
    InsufficientQueries { got: usize },

    /// The recommendation provider produced nothing usable.
    #[error("Could not parse recommendations from response")]
    NoRecommendations,

    /// JSON serialization of a report failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuditError {
    /// Translates a reqwest failure from a provider call.
    pub(crate) fn from_provider(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return AuditError::ProviderTimeout;
        }

        match err.status().map(|s| s.as_u16()) {
            Some(401) => AuditError::InvalidApiKey,
            Some(429) => AuditError::RateLimited,
            Some(code) => AuditError::ApiStatus(code),
            None if err.is_decode() => AuditError::MalformedResponse(err.to_string()),
            None => AuditError::RequestFailed(err.to_string()),
        }
    }
}

/// Result type alias for AuditError.
pub type Result<T> = std::result::Result<T, AuditError>;
