//! Citation checks against an answer engine.
//!
//! Each query is sent to a Perplexity-compatible chat endpoint; the page
//! counts as cited when its normalized URL and one of the returned citation
//! URLs contain one another.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::llm::{ChatClient, ChatMessage, ProviderConfig, truncate_chars};
use crate::{AuditError, Result};

const SNIPPET_CHARS: usize = 300;

/// Reduce a URL to lower-cased `host[:port]/path` for containment checks.
///
/// The scheme, a leading `www.`, query, fragment and trailing slashes are
/// dropped. The whole URL is lower-cased first, so paths compare
/// case-insensitively. Inputs without a scheme are read as `https`.
///
/// # Example
///
/// ```rust
/// use aeo_audit_core::normalize_url;
///
/// assert_eq!(normalize_url("https://www.Example.com/Page/"), normalize_url("example.com/Page"));
/// assert_eq!(normalize_url("https://www.Example.com/Page/"), "example.com/page");
/// ```
pub fn normalize_url(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    let parsed = if lowered.contains("://") {
        Url::parse(&lowered)
    } else {
        Url::parse(&format!("https://{}", lowered))
    };

    match parsed {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("");
            let host = host.strip_prefix("www.").unwrap_or(host);
            let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
            let path = parsed.path().trim_end_matches('/');
            format!("{host}{port}{path}")
        }
        Err(_) => lowered.trim_end_matches('/').to_string(),
    }
}

/// Whether either normalized URL contains the other.
pub fn urls_match(target: &str, source: &str) -> bool {
    let target = normalize_url(target);
    let source = normalize_url(source);
    if target.is_empty() || source.is_empty() {
        return false;
    }
    source.contains(&target) || target.contains(&source)
}

/// Outcome of checking one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationResult {
    pub query: String,
    pub cited: bool,
    /// Start of the engine's answer when the page was cited
    pub citation_snippet: String,
    pub sources_found: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CitationResult {
    fn failed(query: &str, err: &AuditError) -> Self {
        Self {
            query: query.to_string(),
            cited: false,
            citation_snippet: String::new(),
            sources_found: Vec::new(),
            error: Some(err.to_string()),
        }
    }

    /// Evaluate an engine answer for `target_url`.
    pub fn from_answer(query: &str, target_url: &str, answer: &str, sources: Vec<String>) -> Self {
        let cited = sources.iter().any(|source| urls_match(target_url, source));
        let citation_snippet = if !cited {
            String::new()
        } else if answer.chars().count() > SNIPPET_CHARS {
            format!("{}...", truncate_chars(answer, SNIPPET_CHARS))
        } else {
            answer.to_string()
        };

        Self { query: query.to_string(), cited, citation_snippet, sources_found: sources, error: None }
    }
}

/// Aggregate view over a batch of citation checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationSummary {
    pub total_queries: usize,
    pub cited_count: usize,
    pub not_cited_count: usize,
    pub error_count: usize,
    /// Percentage of queries that cited the page
    pub citation_rate: f64,
    /// Every distinct source seen, sorted
    pub all_sources: Vec<String>,
}

impl CitationSummary {
    pub fn from_results(results: &[CitationResult]) -> Self {
        let total_queries = results.len();
        let cited_count = results.iter().filter(|r| r.cited).count();
        let error_count = results.iter().filter(|r| r.error.is_some()).count();
        let citation_rate =
            if total_queries > 0 { cited_count as f64 / total_queries as f64 * 100.0 } else { 0.0 };
        let all_sources = results
            .iter()
            .flat_map(|r| r.sources_found.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            total_queries,
            cited_count,
            not_cited_count: total_queries - cited_count - error_count,
            error_count,
            citation_rate,
            all_sources,
        }
    }
}

/// Sends queries to the answer engine and inspects its citations.
#[derive(Debug, Clone)]
pub struct CitationChecker {
    client: ChatClient,
}

impl CitationChecker {
    /// Perplexity `sonar` with the given key.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::MissingCredential`] for an empty key.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config(api_key, ProviderConfig::perplexity())
    }

    pub fn with_config(api_key: &str, config: ProviderConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AuditError::MissingCredential("Perplexity API key not provided".to_string()));
        }
        Ok(Self { client: ChatClient::new(api_key, config) })
    }

    /// Check one query. Failures are recorded on the result.
    pub async fn check(&self, query: &str, target_url: &str) -> CitationResult {
        match self.client.send(&[ChatMessage::user(query)]).await {
            Ok(response) => {
                let answer = response.first_content().unwrap_or("").to_string();
                let result = CitationResult::from_answer(query, target_url, &answer, response.citations);
                tracing::debug!(query, cited = result.cited, sources = result.sources_found.len(), "citation checked");
                result
            }
            Err(err) => {
                tracing::warn!(query, error = %err, "citation check failed");
                CitationResult::failed(query, &err)
            }
        }
    }

    /// Check each query in order, one request at a time.
    pub async fn check_all(&self, queries: &[String], target_url: &str) -> Vec<CitationResult> {
        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            results.push(self.check(query, target_url).await);
        }
        results
    }
}
