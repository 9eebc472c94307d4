use super::{ScoreBand, is_negative_reason};
use crate::record::{AnalysisRecord, AuditReport};

const RULE_WIDTH: usize = 60;

/// Configuration for plain text output
#[derive(Debug, Clone, Default)]
pub struct TextConfig {
    /// Append the leading window text
    pub include_preview: bool,
}

/// Plain text report renderer
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, report: &AuditReport) -> String {
        convert_to_text(report, &self.config)
    }
}

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("\n{}\n{}\n", title, "-".repeat(title.chars().count())));
}

/// Render a report as plain text.
pub fn convert_to_text(report: &AuditReport, config: &TextConfig) -> String {
    let mut out = format!("AEO Audit: {}\n{}\n", report.analysis.source_url(), "=".repeat(RULE_WIDTH));

    let analysis = match &report.analysis {
        AnalysisRecord::Success(analysis) => analysis,
        AnalysisRecord::Failure { error_message, .. } => {
            out.push_str(&format!("Error: {}\n", error_message));
            return out;
        }
    };

    let title = if analysis.page_title.is_empty() { "(none)" } else { analysis.page_title.as_str() };
    out.push_str(&format!("Title: {}\n", title));
    out.push_str(&format!("Word count: {}\n", analysis.total_word_count));

    heading(&mut out, "Direct answer");
    let answer = &analysis.answer;
    out.push_str(&format!("Score: {}/100 ({})\n", answer.score, ScoreBand::from_score(answer.score)));
    out.push_str(&format!("Direct answer: {}\n", if answer.verdict { "yes" } else { "no" }));
    for reason in &answer.reasons {
        let mark = if is_negative_reason(reason) { "[!]" } else { "[+]" };
        out.push_str(&format!("  {} {}\n", mark, reason));
    }

    if !analysis.first_paragraph_text.is_empty() {
        heading(&mut out, "First paragraph");
        out.push_str(&analysis.first_paragraph_text);
        out.push('\n');
    }

    let source = if analysis.queries_ai_generated { "AI-generated" } else { "rule-based" };
    heading(&mut out, &format!("Queries ({})", source));
    for (i, query) in analysis.generated_queries.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, query));
    }

    if let (Some(results), Some(summary)) = (&report.citations, &report.citation_summary) {
        heading(&mut out, "Citations");
        out.push_str(&format!(
            "Cited in {}/{} queries ({:.0}%)\n",
            summary.cited_count, summary.total_queries, summary.citation_rate
        ));
        for result in results {
            let status = match (&result.error, result.cited) {
                (Some(err), _) => format!("error: {}", err),
                (None, true) => "cited".to_string(),
                (None, false) => "not cited".to_string(),
            };
            out.push_str(&format!("  - {}: {}\n", result.query, status));
        }
    }

    if let Some(err) = &report.citations_error {
        heading(&mut out, "Citations");
        out.push_str(&format!("Not checked: {}\n", err));
    }

    if let Some(recommendations) = &report.recommendations {
        heading(&mut out, "Recommendations");
        for (i, rec) in recommendations.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, rec));
        }
    }

    if let Some(err) = &report.recommendations_error {
        heading(&mut out, "Recommendations");
        out.push_str(&format!("Unavailable: {}\n", err));
    }

    if config.include_preview && !analysis.leading_window_text.is_empty() {
        heading(&mut out, "Content preview");
        out.push_str(&analysis.leading_window_text);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuditError;
    use crate::citation::CitationResult;
    use crate::record::PageAnalysis;
    use crate::scoring::score_direct_answer;

    fn report() -> AuditReport {
        let paragraph = "Photosynthesis is the process plants use to make food.";
        AuditReport::new(AnalysisRecord::Success(PageAnalysis {
            source_url: "https://example.com/photo".into(),
            page_title: "Photosynthesis".into(),
            total_word_count: 120,
            leading_window_text: "Photosynthesis Photosynthesis is the process".into(),
            first_paragraph_text: paragraph.into(),
            answer: score_direct_answer(paragraph),
            generated_queries: vec!["What is photosynthesis?".into(), "b".into(), "c".into()],
            queries_ai_generated: false,
        }))
    }

    #[test]
    fn test_text_report() {
        let text = convert_to_text(&report(), &TextConfig::default());
        assert!(text.starts_with("AEO Audit: https://example.com/photo\n"));
        assert!(text.contains("Title: Photosynthesis"));
        assert!(text.contains("Score: 45/100 (Needs Work)"));
        assert!(text.contains("Direct answer: no"));
        assert!(text.contains("[!] Too short (9 words) - may lack detail"));
        assert!(text.contains("[+] Contains defining language (is, are, means, etc.)"));
        assert!(text.contains("Queries (rule-based)"));
        assert!(text.contains("  1. What is photosynthesis?"));
        assert!(!text.contains("Content preview"));
        assert!(!text.contains("Citations"));
    }

    #[test]
    fn test_text_preview_and_extras() {
        let report = report()
            .with_citations(vec![CitationResult::from_answer(
                "What is photosynthesis?",
                "https://example.com/photo",
                "answer",
                vec!["https://www.example.com/photo/".into()],
            )])
            .with_recommendations(vec!["Lead with a definition.".into()]);
        let text = TextFormatter::new(TextConfig { include_preview: true }).convert(&report);
        assert!(text.contains("Cited in 1/1 queries (100%)"));
        assert!(text.contains("  - What is photosynthesis?: cited"));
        assert!(text.contains("  1. Lead with a definition."));
        assert!(text.contains("Content preview\n---------------\nPhotosynthesis Photosynthesis"));
    }

    #[test]
    fn test_text_failure() {
        let report = AuditReport::new(AnalysisRecord::failure("https://x.test", "HTTP error: 404"));
        let text = convert_to_text(&report, &TextConfig::default());
        assert!(text.contains("Error: HTTP error: 404"));
        assert!(!text.contains("Score"));
    }

    #[test]
    fn test_text_failure_layout() {
        let report = AuditReport::new(AnalysisRecord::failure("u", "HTTP error: 500"));
        let expected = format!("AEO Audit: u\n{}\nError: HTTP error: 500\n", "=".repeat(RULE_WIDTH));
        assert_eq!(convert_to_text(&report, &TextConfig::default()), expected);
    }

    #[test]
    fn test_text_follow_up_errors() {
        let report = report()
            .with_citations_error(&AuditError::MissingCredential("Perplexity API key not provided".into()))
            .with_recommendations_error(&AuditError::InvalidApiKey);
        let text = convert_to_text(&report, &TextConfig::default());
        assert!(text.contains("Score: 45/100 (Needs Work)"));
        assert!(text.contains("Citations\n---------\nNot checked: Missing credential: Perplexity API key not provided"));
        assert!(text.contains("Recommendations\n---------------\nUnavailable: Invalid API key"));
    }
}
