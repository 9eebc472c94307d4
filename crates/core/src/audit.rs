//! Main audit API.
//!
//! [`Auditor`] runs the whole pipeline for one page: fetch, extract,
//! measure, score the opening paragraph, and synthesize search queries.
//! Every call is independent; nothing is cached between calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use aeo_audit_core::analyze;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let record = analyze("example.com/guide", None).await;
//! if let Some(error) = record.error_message() {
//!     eprintln!("audit failed: {error}");
//! } else {
//!     println!("score {}", record.answer_score());
//! }
//! # }
//! ```

use crate::extract::{ExtractConfig, ExtractedContent, extract_content_with_config};
use crate::fetch::{FetchConfig, fetch_url, normalize_input_url};
use crate::metrics::{DEFAULT_WINDOW_WORDS, count_words, first_n_words};
use crate::queries::{OpenAiQueryProvider, QueryContext, QueryProvider, QuerySynthesizer};
use crate::record::{AnalysisRecord, PageAnalysis};
use crate::scoring::{DirectAnswer, score_direct_answer};

/// Configuration for an audit.
///
/// # Example
///
/// ```rust
/// use aeo_audit_core::AuditConfig;
///
/// let config = AuditConfig::builder()
///     .window_words(300)
///     .fetch_timeout(5)
///     .build();
/// assert_eq!(config.window_words, 300);
/// ```
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Size of the leading text window (default: 500).
    pub window_words: usize,

    /// Extraction settings.
    pub extract: ExtractConfig,

    /// Page fetch settings.
    pub fetch: FetchConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { window_words: DEFAULT_WINDOW_WORDS, extract: ExtractConfig::default(), fetch: FetchConfig::default() }
    }
}

impl AuditConfig {
    /// Creates a new builder for AuditConfig.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::new()
    }
}

/// Builder for AuditConfig.
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: AuditConfig::default() }
    }

    /// Sets the leading window size in words.
    pub fn window_words(mut self, value: usize) -> Self {
        self.config.window_words = value;
        self
    }

    /// Sets the paragraph length threshold in characters.
    pub fn min_paragraph_chars(mut self, value: usize) -> Self {
        self.config.extract.min_paragraph_chars = value;
        self
    }

    /// Sets the fetch timeout in seconds.
    pub fn fetch_timeout(mut self, secs: u64) -> Self {
        self.config.fetch.timeout = secs;
        self
    }

    /// Sets the User-Agent sent when fetching.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    /// Builds the config.
    pub fn build(self) -> AuditConfig {
        self.config
    }
}

impl Default for AuditConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned output of the synchronous part of the pipeline.
struct Inspection {
    content: ExtractedContent,
    total_word_count: usize,
    leading_window_text: String,
    answer: DirectAnswer,
}

/// Runs audits.
///
/// Holds configuration and an optional query provider; no per-page state.
#[derive(Default)]
pub struct Auditor {
    config: AuditConfig,
    synthesizer: QuerySynthesizer,
}

impl Auditor {
    /// Default settings, rule-based queries.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AuditConfig) -> Self {
        Self { config, synthesizer: QuerySynthesizer::new() }
    }

    /// Try `provider` for query generation before the rules.
    pub fn with_query_provider(mut self, provider: Box<dyn QueryProvider>) -> Self {
        self.synthesizer = QuerySynthesizer::with_provider(provider);
        self
    }

    /// Use OpenAI for query generation when `api_key` is present and non-empty.
    pub fn with_openai_key(self, api_key: Option<&str>) -> Self {
        match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => self.with_query_provider(Box::new(OpenAiQueryProvider::new(key))),
            None => self,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Fetch and audit a page.
    ///
    /// The URL gets an `https://` prefix when it has no scheme. A fetch
    /// failure yields a failure record carrying the fetch message verbatim;
    /// nothing else is attempted.
    pub async fn analyze(&self, url: &str) -> AnalysisRecord {
        let url = normalize_input_url(url);
        tracing::debug!(url = %url, "fetching page");

        match fetch_url(&url, &self.config.fetch).await {
            Ok(html) => self.analyze_html(&url, &html).await,
            Err(err) => {
                tracing::info!(url = %url, error = %err, "fetch failed");
                AnalysisRecord::failure(url, err.to_string())
            }
        }
    }

    /// Audit markup the caller already holds. `source_url` is recorded as is.
    pub async fn analyze_html(&self, source_url: &str, html: &str) -> AnalysisRecord {
        let inspection = match self.inspect(html) {
            Ok(inspection) => inspection,
            Err(err) => return AnalysisRecord::failure(source_url, err.to_string()),
        };

        let context = QueryContext {
            title: &inspection.content.title,
            first_paragraph: inspection.content.first_paragraph(),
            leading_window: &inspection.leading_window_text,
        };
        let generated = self.synthesizer.synthesize(&context).await;

        tracing::debug!(
            url = source_url,
            words = inspection.total_word_count,
            score = inspection.answer.score,
            ai_queries = generated.ai_generated,
            "page analyzed"
        );

        let first_paragraph_text = inspection.content.first_paragraph().to_string();
        AnalysisRecord::Success(PageAnalysis {
            source_url: source_url.to_string(),
            page_title: inspection.content.title,
            total_word_count: inspection.total_word_count,
            leading_window_text: inspection.leading_window_text,
            first_paragraph_text,
            answer: inspection.answer,
            generated_queries: generated.queries,
            queries_ai_generated: generated.ai_generated,
        })
    }

    /// Extraction, metrics and scoring. The parsed DOM never outlives this call.
    fn inspect(&self, html: &str) -> crate::Result<Inspection> {
        let content = extract_content_with_config(html, &self.config.extract)?;
        let total_word_count = count_words(&content.full_text);
        let leading_window_text = first_n_words(&content.full_text, self.config.window_words);
        let answer = score_direct_answer(content.first_paragraph());

        Ok(Inspection { content, total_word_count, leading_window_text, answer })
    }
}

/// Fetch and audit `url`, using OpenAI for queries when a key is given.
pub async fn analyze(url: &str, provider_key: Option<&str>) -> AnalysisRecord {
    Auditor::new().with_openai_key(provider_key).analyze(url).await
}

/// Audit markup with default settings and rule-based queries.
pub async fn analyze_html(source_url: &str, html: &str) -> AnalysisRecord {
    Auditor::new().analyze_html(source_url, html).await
}
