//! Minimal chat-completions client shared by the LLM-backed providers.
//!
//! Speaks the OpenAI-compatible wire format (also used by Perplexity): a
//! bearer credential, a list of role/content messages, and a response whose
//! first choice carries the reply. Perplexity adds a top-level `citations`
//! array, which is surfaced when present.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{AuditError, Result};

/// Endpoint and sampling settings for one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Full chat-completions URL.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Reply length cap; omitted from the request when `None`.
    pub max_tokens: Option<u32>,
    /// Sampling temperature; omitted from the request when `None`.
    pub temperature: Option<f32>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl ProviderConfig {
    /// OpenAI `gpt-4o-mini` with the given reply cap.
    pub fn openai(max_tokens: u32) -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: Some(max_tokens),
            temperature: Some(0.7),
            timeout: 30,
        }
    }

    /// Perplexity `sonar` with provider defaults for sampling.
    pub fn perplexity() -> Self {
        Self {
            endpoint: "https://api.perplexity.ai/chat/completions".to_string(),
            model: "sonar".to_string(),
            max_tokens: None,
            temperature: None,
            timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatReply,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content.as_deref())
    }
}

/// A configured client for one provider and credential.
#[derive(Debug, Clone)]
pub struct ChatClient {
    config: ProviderConfig,
    api_key: String,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>, config: ProviderConfig) -> Self {
        Self { config, api_key: api_key.into() }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Sends one chat request and decodes the response.
    ///
    /// # Errors
    ///
    /// Timeouts, 401, 429 and other statuses map to their own
    /// [`AuditError`] variants; undecodable bodies map to
    /// [`AuditError::MalformedResponse`].
    pub async fn send(&self, messages: &[ChatMessage]) -> Result<ChatResponse> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout))
            .build()
            .map_err(|e| AuditError::RequestFailed(e.to_string()))?;

        let body = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        tracing::debug!(endpoint = %self.config.endpoint, model = %self.config.model, "sending chat request");

        let response = client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(AuditError::from_provider)?
            .error_for_status()
            .map_err(AuditError::from_provider)?;

        let text = response.text().await.map_err(AuditError::from_provider)?;
        serde_json::from_str(&text).map_err(|e| AuditError::MalformedResponse(e.to_string()))
    }

    /// Sends a system + user prompt and returns the trimmed reply text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let response = self.send(&[ChatMessage::system(system), ChatMessage::user(user)]).await?;
        response
            .first_content()
            .map(|c| c.trim().to_string())
            .ok_or_else(|| AuditError::MalformedResponse("missing choices[0].message.content".to_string()))
    }
}

/// Strips list decoration from the front of a reply line.
///
/// Leading digits, `.`, `-`, `)`, `*`, `•`, spaces and any `extra` characters
/// are removed, so "1. foo" and "• foo" both become "foo".
pub fn strip_list_marker<'a>(line: &'a str, extra: &[char]) -> &'a str {
    line.trim_start_matches(|c: char| c.is_ascii_digit() || ".-)*• ".contains(c) || extra.contains(&c))
        .trim()
}

/// Splits a reply into non-empty lines with list markers removed.
pub fn reply_lines(reply: &str, extra: &[char]) -> Vec<String> {
    reply
        .lines()
        .map(|line| strip_list_marker(line.trim(), extra))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Truncates to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
