//! Page retrieval.
//!
//! This module provides the GET-with-timeout collaborator used by the audit
//! pipeline, plus the URL normalization applied before fetching.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::FetchError;

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 10, user_agent: "Mozilla/5.0 (compatible; AEOAuditBot/1.0)".to_string() }
    }
}

/// Prefixes `https://` when the input carries no http(s) scheme.
pub fn normalize_input_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Fetches HTML content from a URL.
///
/// Performs a single GET request (no retries), follows redirects, and treats
/// any non-success status as a failure. Errors are mapped onto the four
/// user-facing [`FetchError`] kinds.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String, FetchError> {
    let parsed_url = Url::parse(url).map_err(|e| FetchError::Other(e.to_string()))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(|e| FetchError::Other(e.to_string()))?;

    let map_err = |e: reqwest::Error| match FetchError::from(e) {
        FetchError::Timeout { .. } => FetchError::Timeout { timeout: config.timeout },
        other => other,
    };

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(map_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    response.text().await.map_err(map_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 10);
        assert!(config.user_agent.contains("AEOAuditBot"));
    }

    #[test]
    fn test_normalize_input_url() {
        assert_eq!(normalize_input_url("example.com/page"), "https://example.com/page");
        assert_eq!(normalize_input_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_input_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_input_url("  example.com "), "https://example.com");
    }

    #[tokio::test]
    async fn test_fetch_url_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/page").header("user-agent", "Mozilla/5.0 (compatible; AEOAuditBot/1.0)");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body("<html><body><p>hi</p></body></html>");
            })
            .await;

        let body = fetch_url(&server.url("/page"), &FetchConfig::default()).await.unwrap();
        mock.assert_async().await;
        assert!(body.contains("<p>hi</p>"));
    }

    #[tokio::test]
    async fn test_fetch_url_http_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).body("not found");
            })
            .await;

        let result = fetch_url(&server.url("/missing"), &FetchConfig::default()).await;
        assert_eq!(result, Err(FetchError::Status(404)));
        assert_eq!(result.unwrap_err().to_string(), "HTTP error: 404");
    }

    #[tokio::test]
    async fn test_fetch_url_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_secs(3)).body("late");
            })
            .await;

        let config = FetchConfig { timeout: 1, ..Default::default() };
        let result = fetch_url(&server.url("/slow"), &config).await;
        assert_eq!(result, Err(FetchError::Timeout { timeout: 1 }));
    }

    #[tokio::test]
    async fn test_fetch_url_invalid() {
        let result = fetch_url("not a url", &FetchConfig::default()).await;
        assert!(matches!(result, Err(FetchError::Other(_))));
    }
}
