//! The analysis record produced by one audit.
//!
//! A record is either a full [`PageAnalysis`] or a failure carrying only the
//! URL and a message, so a failed audit cannot expose half-filled fields.
//! The flat accessors on [`AnalysisRecord`] return neutral defaults for a
//! failure.

use serde::{Deserialize, Serialize};

use crate::citation::{CitationResult, CitationSummary};
use crate::scoring::DirectAnswer;
use crate::{AuditError, Result};

/// Everything derived from a successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub source_url: String,
    pub page_title: String,
    pub total_word_count: usize,
    pub leading_window_text: String,
    pub first_paragraph_text: String,
    pub answer: DirectAnswer,
    pub generated_queries: Vec<String>,
    pub queries_ai_generated: bool,
}

/// Outcome of one audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisRecord {
    Success(PageAnalysis),
    Failure { source_url: String, error_message: String },
}

impl AnalysisRecord {
    pub fn failure(source_url: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self::Failure { source_url: source_url.into(), error_message: error_message.into() }
    }

    pub fn source_url(&self) -> &str {
        match self {
            Self::Success(analysis) => &analysis.source_url,
            Self::Failure { source_url, .. } => source_url,
        }
    }

    pub fn extraction_succeeded(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error_message, .. } => Some(error_message),
        }
    }

    pub fn as_success(&self) -> Option<&PageAnalysis> {
        match self {
            Self::Success(analysis) => Some(analysis),
            Self::Failure { .. } => None,
        }
    }

    pub fn page_title(&self) -> &str {
        self.as_success().map_or("", |a| a.page_title.as_str())
    }

    pub fn total_word_count(&self) -> usize {
        self.as_success().map_or(0, |a| a.total_word_count)
    }

    pub fn leading_window_text(&self) -> &str {
        self.as_success().map_or("", |a| a.leading_window_text.as_str())
    }

    pub fn first_paragraph_text(&self) -> &str {
        self.as_success().map_or("", |a| a.first_paragraph_text.as_str())
    }

    pub fn answer_verdict(&self) -> bool {
        self.as_success().is_some_and(|a| a.answer.verdict)
    }

    pub fn answer_score(&self) -> u8 {
        self.as_success().map_or(0, |a| a.answer.score)
    }

    pub fn answer_reasons(&self) -> &[String] {
        match self.as_success() {
            Some(a) => &a.answer.reasons,
            None => &[],
        }
    }

    pub fn generated_queries(&self) -> &[String] {
        match self.as_success() {
            Some(a) => &a.generated_queries,
            None => &[],
        }
    }

    pub fn queries_ai_generated(&self) -> bool {
        self.as_success().is_some_and(|a| a.queries_ai_generated)
    }

    /// Gets the record as structured JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(AuditError::from)
    }
}

/// An analysis together with the optional follow-up checks.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub analysis: AnalysisRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<CitationResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_summary: Option<CitationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    /// Why the citation check could not run at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations_error: Option<String>,
    /// Why no recommendations were produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations_error: Option<String>,
}

impl AuditReport {
    pub fn new(analysis: AnalysisRecord) -> Self {
        Self {
            analysis,
            citations: None,
            citation_summary: None,
            recommendations: None,
            citations_error: None,
            recommendations_error: None,
        }
    }

    /// Attach citation results and their summary.
    pub fn with_citations(mut self, results: Vec<CitationResult>) -> Self {
        self.citation_summary = Some(CitationSummary::from_results(&results));
        self.citations = Some(results);
        self
    }

    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = Some(recommendations);
        self
    }

    /// Record a citation check that failed as a whole; the analysis stands.
    pub fn with_citations_error(mut self, error: &AuditError) -> Self {
        self.citations_error = Some(error.to_string());
        self
    }

    /// Record a failed recommendation request; the analysis stands.
    pub fn with_recommendations_error(mut self, error: &AuditError) -> Self {
        self.recommendations_error = Some(error.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success() -> AnalysisRecord {
        AnalysisRecord::Success(PageAnalysis {
            source_url: "https://example.com".into(),
            page_title: "Example".into(),
            total_word_count: 42,
            leading_window_text: "Example words".into(),
            first_paragraph_text: "Example paragraph".into(),
            answer: DirectAnswer { verdict: true, score: 70, reasons: vec!["Good".into()] },
            generated_queries: vec!["a".into(), "b".into(), "c".into()],
            queries_ai_generated: false,
        })
    }

    #[test]
    fn test_failure_defaults() {
        let record = AnalysisRecord::failure("https://example.com", "HTTP error: 404");
        assert!(!record.extraction_succeeded());
        assert_eq!(record.error_message(), Some("HTTP error: 404"));
        assert_eq!(record.page_title(), "");
        assert_eq!(record.total_word_count(), 0);
        assert_eq!(record.leading_window_text(), "");
        assert_eq!(record.first_paragraph_text(), "");
        assert!(!record.answer_verdict());
        assert_eq!(record.answer_score(), 0);
        assert!(record.answer_reasons().is_empty());
        assert!(record.generated_queries().is_empty());
        assert!(!record.queries_ai_generated());
    }

    #[test]
    fn test_success_accessors() {
        let record = success();
        assert!(record.extraction_succeeded());
        assert_eq!(record.error_message(), None);
        assert_eq!(record.source_url(), "https://example.com");
        assert_eq!(record.answer_score(), 70);
        assert_eq!(record.generated_queries().len(), 3);
    }

    #[test]
    fn test_json_shape() {
        let json = success().to_json().unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["answer"]["score"], 70);

        let failure = AnalysisRecord::failure("u", "boom").to_json().unwrap();
        assert_eq!(failure["status"], "failure");
        assert_eq!(failure["error_message"], "boom");
        assert!(failure.get("page_title").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let record = success();
        let back: AnalysisRecord = serde_json::from_value(record.to_json().unwrap()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_report_summary_attached() {
        let report = AuditReport::new(success()).with_citations(vec![]);
        assert_eq!(report.citation_summary.as_ref().map(|s| s.total_queries), Some(0));
        assert!(report.recommendations.is_none());
    }

    #[test]
    fn test_follow_up_errors_keep_analysis() {
        let report = AuditReport::new(success())
            .with_citations_error(&AuditError::MissingCredential("Perplexity API key not provided".into()))
            .with_recommendations_error(&AuditError::RateLimited);

        assert!(report.analysis.extraction_succeeded());
        assert!(report.citations.is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["analysis"]["status"], "success");
        assert_eq!(json["citations_error"], "Missing credential: Perplexity API key not provided");
        assert_eq!(json["recommendations_error"], "Rate limit exceeded");

        let plain = serde_json::to_value(AuditReport::new(success())).unwrap();
        assert!(plain.get("citations_error").is_none());
        assert!(plain.get("recommendations_error").is_none());
    }
}
