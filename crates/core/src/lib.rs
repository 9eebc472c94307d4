//! Answer-engine optimization audits for web pages.
//!
//! Fetches a page, isolates its main content, measures it, scores how well the
//! opening paragraph works as a direct answer, and proposes the search
//! queries a reader would type to find it. Citation checks against an answer
//! engine and improvement recommendations are available as follow-up steps.
//!
//! # Example
//!
//! ```rust
//! use aeo_audit_core::{score_direct_answer, synthesize_queries};
//!
//! let answer = score_direct_answer("The kettle is a small appliance for boiling water.");
//! assert!(answer.score > 0);
//!
//! let queries = synthesize_queries("Kettles | Home Blog", "");
//! assert_eq!(queries.len(), 3);
//! ```

pub mod audit;
pub mod citation;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod llm;
pub mod metrics;
pub mod parse;
pub mod preprocess;
pub mod queries;
pub mod recommend;
pub mod record;
pub mod scoring;

pub use audit::{AuditConfig, AuditConfigBuilder, Auditor, analyze, analyze_html};
pub use citation::{CitationChecker, CitationResult, CitationSummary, normalize_url, urls_match};
pub use error::{AuditError, FetchError, Result};
#[doc(hidden)]
pub use extract::{ExtractConfig, ExtractedContent};
pub use extract::{extract_content, extract_content_with_config};
pub use fetch::{FetchConfig, fetch_url};
pub use formatters::{JsonConfig, JsonFormatter, MarkdownConfig, MarkdownFormatter, TextConfig, TextFormatter};
pub use formatters::{ScoreBand, convert_to_json, convert_to_markdown, convert_to_text};
pub use llm::{ChatClient, ProviderConfig};
pub use metrics::{count_words, first_n_words};
pub use parse::Document;
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
pub use queries::{GeneratedQueries, OpenAiQueryProvider, QueryContext, QueryProvider, QuerySynthesizer, synthesize_queries};
pub use recommend::{RecommendationInput, Recommender};
pub use record::{AnalysisRecord, AuditReport, PageAnalysis};
pub use scoring::{DirectAnswer, score_direct_answer};
