//! Search-query synthesis.
//!
//! [`synthesize_queries`] is the rule-based generator that works from the
//! page title and first paragraph alone. A [`QueryProvider`] can be placed in
//! front of it; [`QuerySynthesizer`] tries the provider first and falls back
//! to the rules on any error or short answer.

use async_trait::async_trait;

use crate::llm::{ChatClient, ProviderConfig, reply_lines, truncate_chars};
use crate::{AuditError, Result};

/// Every synthesis returns exactly this many queries.
pub const QUERY_COUNT: usize = 3;

/// Returned when there is neither a title nor a paragraph.
pub const DEFAULT_QUERIES: [&str; QUERY_COUNT] =
    ["What is this topic?", "How does this work?", "Why is this important?"];

/// Stand-in subject when the title cleans down to nothing.
const FALLBACK_SUBJECT: &str = "this topic";

/// Generic openers removed from the cleaned title, first match only.
const GENERIC_PREFIXES: &[&str] = &[
    "how to ",
    "guide to ",
    "the complete ",
    "the ultimate ",
    "a guide to ",
    "understanding ",
    "learn about ",
];

const TITLE_SEPARATORS: &[char] = &['|', '-', '–', '—'];

const PROCESS_TERMS: &[&str] = &["process", "method", "step", "way", "approach"];
const VALUE_TERMS: &[&str] = &["important", "benefit", "advantage", "help", "improve"];
const COMPARISON_TERMS: &[&str] = &["best", "top", "compare", "vs", "versus", "difference"];

/// Page context handed to query generators.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub title: &'a str,
    pub first_paragraph: &'a str,
    pub leading_window: &'a str,
}

/// Queries plus where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQueries {
    pub queries: Vec<String>,
    pub ai_generated: bool,
}

/// An external generator that may replace the rule-based one.
#[async_trait]
pub trait QueryProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Produce candidate queries for the page.
    async fn generate(&self, context: &QueryContext<'_>) -> Result<Vec<String>>;
}

/// Text before the first separator, trimmed and lower-cased.
///
/// "How to Train a Dog | PetSite" becomes "how to train a dog".
pub fn clean_title(title: &str) -> String {
    title.split(TITLE_SEPARATORS).next().unwrap_or("").trim().to_lowercase()
}

/// Drops the first matching generic opener from a cleaned title.
pub fn strip_generic_prefix(cleaned: &str) -> &str {
    GENERIC_PREFIXES
        .iter()
        .find_map(|prefix| cleaned.strip_prefix(prefix))
        .unwrap_or(cleaned)
        .trim()
}

fn mentions(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

/// Rule-based query synthesis.
///
/// Always returns exactly three non-empty queries.
///
/// # Example
///
/// ```rust
/// use aeo_audit_core::synthesize_queries;
///
/// let queries = synthesize_queries(
///     "How to Train a Dog | PetSite",
///     "Training a dog takes patience and consistent methods.",
/// );
/// assert_eq!(queries, ["What is train a dog?", "how to train a dog?", "Why use train a dog?"]);
/// ```
pub fn synthesize_queries(title: &str, first_paragraph: &str) -> Vec<String> {
    if title.trim().is_empty() && first_paragraph.trim().is_empty() {
        return DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect();
    }

    let cleaned = clean_title(title);
    let topic = strip_generic_prefix(&cleaned);
    let subject = if topic.is_empty() { FALLBACK_SUBJECT } else { topic };

    let paragraph = first_paragraph.to_lowercase();
    let has_paragraph = !paragraph.trim().is_empty();

    let mut queries = Vec::with_capacity(QUERY_COUNT);

    if !topic.is_empty() {
        queries.push(format!("What is {topic}?"));
    }

    let how = if title.to_lowercase().contains("how to") && !cleaned.is_empty() {
        format!("{cleaned}?")
    } else if !has_paragraph || mentions(&paragraph, PROCESS_TERMS) {
        format!("How does {subject} work?")
    } else {
        format!("How to use {subject}?")
    };
    queries.push(how);

    let why = if !has_paragraph || mentions(&paragraph, VALUE_TERMS) {
        format!("Why is {subject} important?")
    } else if mentions(&paragraph, COMPARISON_TERMS) {
        format!("What is the best {subject}?")
    } else {
        format!("Why use {subject}?")
    };
    queries.push(why);

    while queries.len() < QUERY_COUNT {
        queries.push(format!("What are the benefits of {subject}?"));
    }
    queries.truncate(QUERY_COUNT);
    queries
}

/// Provider-first query generation with a rule-based fallback.
#[derive(Default)]
pub struct QuerySynthesizer {
    provider: Option<Box<dyn QueryProvider>>,
}

impl QuerySynthesizer {
    /// Rules only.
    pub fn new() -> Self {
        Self { provider: None }
    }

    /// Try `provider` before the rules.
    pub fn with_provider(provider: Box<dyn QueryProvider>) -> Self {
        Self { provider: Some(provider) }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Generate exactly three queries.
    ///
    /// Provider output is used only when it yields at least three non-empty
    /// queries; any failure is logged and swallowed.
    pub async fn synthesize(&self, context: &QueryContext<'_>) -> GeneratedQueries {
        if let Some(provider) = &self.provider {
            match provider.generate(context).await {
                Ok(queries) => {
                    let usable: Vec<String> = queries
                        .into_iter()
                        .map(|q| q.trim().to_string())
                        .filter(|q| !q.is_empty())
                        .take(QUERY_COUNT)
                        .collect();
                    if usable.len() == QUERY_COUNT {
                        return GeneratedQueries { queries: usable, ai_generated: true };
                    }
                    tracing::warn!(provider = provider.name(), got = usable.len(), "too few queries, using rules");
                }
                Err(err) => {
                    tracing::warn!(provider = provider.name(), error = %err, "query provider failed, using rules");
                }
            }
        }

        GeneratedQueries { queries: synthesize_queries(context.title, context.first_paragraph), ai_generated: false }
    }
}

const QUERY_PROMPT: &str = "You are an SEO expert. Based on this content, generate exactly 3 search queries that a real person would type into Google or an AI assistant to find this information. Return ONLY the 3 queries, one per line, no numbering or explanation.";

/// OpenAI-backed query generation.
pub struct OpenAiQueryProvider {
    client: ChatClient,
}

impl OpenAiQueryProvider {
    /// `gpt-4o-mini`, 100 tokens, temperature 0.7.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(api_key, ProviderConfig::openai(100))
    }

    pub fn with_config(api_key: impl Into<String>, config: ProviderConfig) -> Self {
        Self { client: ChatClient::new(api_key, config) }
    }
}

#[async_trait]
impl QueryProvider for OpenAiQueryProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, context: &QueryContext<'_>) -> Result<Vec<String>> {
        let user = format!(
            "Title: {}\n\nFirst paragraph: {}\n\nContent excerpt: {}",
            context.title,
            context.first_paragraph,
            truncate_chars(context.leading_window, 1000)
        );

        let reply = self.client.complete(QUERY_PROMPT, &user).await?;
        let queries = reply_lines(&reply, &[]);
        if queries.len() < QUERY_COUNT {
            return Err(AuditError::InsufficientQueries { got: queries.len() });
        }

        Ok(queries.into_iter().take(QUERY_COUNT).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    struct Canned(Result<Vec<String>>);

    #[async_trait]
    impl QueryProvider for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _context: &QueryContext<'_>) -> Result<Vec<String>> {
            match &self.0 {
                Ok(queries) => Ok(queries.clone()),
                Err(_) => Err(AuditError::RateLimited),
            }
        }
    }

    fn context<'a>(title: &'a str, paragraph: &'a str) -> QueryContext<'a> {
        QueryContext { title, first_paragraph: paragraph, leading_window: paragraph }
    }

    #[test]
    fn test_dog_training_example() {
        let queries =
            synthesize_queries("How to Train a Dog | PetSite", "Training a dog takes patience and consistent methods.");
        assert_eq!(queries, vec!["What is train a dog?", "how to train a dog?", "Why use train a dog?"]);
    }

    #[test]
    fn test_defaults_when_empty() {
        assert_eq!(synthesize_queries("", ""), DEFAULT_QUERIES.to_vec());
        assert_eq!(synthesize_queries("  ", "\n"), DEFAULT_QUERIES.to_vec());
    }

    #[rstest]
    #[case("Rust Programming | Blog", "rust programming")]
    #[case("Rust - The Book", "rust")]
    #[case("Coffee — A History", "coffee")]
    #[case("Tea – Leaves", "tea")]
    #[case("No separators", "no separators")]
    fn test_clean_title(#[case] title: &str, #[case] cleaned: &str) {
        assert_eq!(clean_title(title), cleaned);
    }

    #[rstest]
    #[case("guide to sourdough", "sourdough")]
    #[case("a guide to sourdough", "sourdough")]
    #[case("the ultimate sourdough", "sourdough")]
    #[case("understanding how to bake", "how to bake")]
    #[case("learn about bread", "bread")]
    #[case("guidelines for bread", "guidelines for bread")]
    fn test_strip_generic_prefix(#[case] cleaned: &str, #[case] topic: &str) {
        assert_eq!(strip_generic_prefix(cleaned), topic);
    }

    #[test]
    fn test_process_paragraph() {
        let queries = synthesize_queries("Composting", "Composting is a process that turns waste into soil.");
        assert_eq!(queries[0], "What is composting?");
        assert_eq!(queries[1], "How does composting work?");
        assert_eq!(queries[2], "Why use composting?");
    }

    #[test]
    fn test_value_and_comparison_paragraphs() {
        let value = synthesize_queries("Sleep", "Sleep can improve memory.");
        assert_eq!(value[1], "How to use sleep?");
        assert_eq!(value[2], "Why is sleep important?");

        let compare = synthesize_queries("Laptops", "We compare laptops side by side.");
        assert_eq!(compare[2], "What is the best laptops?");
    }

    #[test]
    fn test_title_only() {
        let queries = synthesize_queries("Kubernetes", "");
        assert_eq!(
            queries,
            vec!["What is kubernetes?", "How does kubernetes work?", "Why is kubernetes important?"]
        );
    }

    #[test]
    fn test_paragraph_only_uses_fallback_subject() {
        let queries = synthesize_queries("", "Plain words only.");
        assert_eq!(
            queries,
            vec!["How to use this topic?", "Why use this topic?", "What are the benefits of this topic?"]
        );
    }

    #[tokio::test]
    async fn test_provider_output_is_used() {
        let provider = Canned(Ok(vec!["q1".into(), " q2 ".into(), "q3".into(), "q4".into()]));
        let synthesizer = QuerySynthesizer::with_provider(Box::new(provider));
        let generated = synthesizer.synthesize(&context("Title", "Para")).await;
        assert!(generated.ai_generated);
        assert_eq!(generated.queries, vec!["q1", "q2", "q3"]);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back() {
        let synthesizer = QuerySynthesizer::with_provider(Box::new(Canned(Err(AuditError::RateLimited))));
        let generated = synthesizer.synthesize(&context("Kubernetes", "")).await;
        assert!(!generated.ai_generated);
        assert_eq!(generated.queries, synthesize_queries("Kubernetes", ""));
    }

    #[tokio::test]
    async fn test_short_provider_output_falls_back() {
        let provider = Canned(Ok(vec!["only one".into(), "   ".into(), "two".into()]));
        let synthesizer = QuerySynthesizer::with_provider(Box::new(provider));
        let generated = synthesizer.synthesize(&context("Kubernetes", "")).await;
        assert!(!generated.ai_generated);
        assert_eq!(generated.queries.len(), QUERY_COUNT);
    }

    proptest! {
        #[test]
        fn always_three_non_empty(title in "\\PC{0,40}", paragraph in "\\PC{0,80}") {
            let queries = synthesize_queries(&title, &paragraph);
            prop_assert_eq!(queries.len(), QUERY_COUNT);
            prop_assert!(queries.iter().all(|q| !q.trim().is_empty()));
        }
    }
}
