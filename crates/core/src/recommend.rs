//! LLM-generated improvement recommendations.

use crate::citation::CitationResult;
use crate::llm::{ChatClient, ProviderConfig, reply_lines, truncate_chars};
use crate::record::PageAnalysis;
use crate::{AuditError, Result};

/// At most this many recommendations are returned.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Lines this short are treated as noise.
const MIN_RECOMMENDATION_CHARS: usize = 10;

const RECOMMEND_PROMPT: &str = r#"You are an AEO (Answer Engine Optimization) expert. Based on this content analysis, provide exactly 3 specific, actionable recommendations to improve this page's chances of being cited by AI search engines like ChatGPT, Perplexity, and Google AI Overviews.

Be specific - reference actual content from the page. Focus on:
- How to make the opening more "answer-ready"
- Structural improvements for AI parsing
- Content gaps that would help AI cite this page

Format: one recommendation per line, no numbering or bullet points. Each should be 1-2 sentences max."#;

/// Everything the recommender looks at.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInput<'a> {
    pub title: &'a str,
    pub first_paragraph: &'a str,
    pub leading_window: &'a str,
    pub answer_score: u8,
    pub citations: Option<&'a [CitationResult]>,
}

impl<'a> RecommendationInput<'a> {
    pub fn from_analysis(analysis: &'a PageAnalysis, citations: Option<&'a [CitationResult]>) -> Self {
        Self {
            title: &analysis.page_title,
            first_paragraph: &analysis.first_paragraph_text,
            leading_window: &analysis.leading_window_text,
            answer_score: analysis.answer.score,
            citations,
        }
    }

    /// The user message sent to the model.
    pub fn render(&self) -> String {
        let mut citation_context = String::new();
        if let Some(results) = self.citations {
            let cited: Vec<&str> = results.iter().filter(|r| r.cited).map(|r| r.query.as_str()).collect();
            let not_cited: Vec<&str> =
                results.iter().filter(|r| !r.cited && r.error.is_none()).map(|r| r.query.as_str()).collect();

            if !cited.is_empty() {
                citation_context.push_str(&format!("\nQueries where page WAS cited: {}", cited.join(", ")));
            }
            if !not_cited.is_empty() {
                citation_context.push_str(&format!("\nQueries where page was NOT cited: {}", not_cited.join(", ")));
            }
        }

        format!(
            "Page Title: {}\n\nFirst Paragraph: {}\n\nContent Excerpt (first 500 words): {}\n\nDirect Answer Score: {}/100\n{}",
            self.title,
            self.first_paragraph,
            truncate_chars(self.leading_window, 1500),
            self.answer_score,
            citation_context
        )
    }
}

/// Turns an analysis into up to three actionable suggestions.
#[derive(Debug, Clone)]
pub struct Recommender {
    api_key: Option<String>,
    config: ProviderConfig,
}

impl Recommender {
    /// `gpt-4o-mini`, 300 tokens, temperature 0.7.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_config(api_key, ProviderConfig::openai(300))
    }

    pub fn with_config(api_key: Option<String>, config: ProviderConfig) -> Self {
        Self { api_key, config }
    }

    /// Ask the model for recommendations.
    ///
    /// # Errors
    ///
    /// Fails immediately with [`AuditError::MissingCredential`] when no key is
    /// configured, and with [`AuditError::NoRecommendations`] when the reply
    /// holds no usable line. Fewer than three usable lines is not an error.
    pub async fn recommend(&self, input: &RecommendationInput<'_>) -> Result<Vec<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AuditError::MissingCredential("OpenAI API key not provided".to_string()))?;

        let client = ChatClient::new(api_key, self.config.clone());
        let reply = client.complete(RECOMMEND_PROMPT, &input.render()).await?;

        let recommendations = parse_recommendations(&reply);
        if recommendations.is_empty() {
            return Err(AuditError::NoRecommendations);
        }
        Ok(recommendations)
    }
}

/// Usable recommendation lines from a model reply, at most three.
pub fn parse_recommendations(reply: &str) -> Vec<String> {
    reply_lines(reply, &['→'])
        .into_iter()
        .filter(|line| line.chars().count() > MIN_RECOMMENDATION_CHARS)
        .take(MAX_RECOMMENDATIONS)
        .collect()
}
