use super::{ScoreBand, is_negative_reason};
use crate::record::{AnalysisRecord, AuditReport};

/// Configuration for Markdown reports
#[derive(Debug, Clone, Default)]
pub struct MarkdownConfig {
    /// Append the leading window text as a quote block
    pub include_preview: bool,
}

/// Markdown report renderer
pub struct MarkdownFormatter {
    config: MarkdownConfig,
}

impl MarkdownFormatter {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, report: &AuditReport) -> String {
        convert_to_markdown(report, &self.config)
    }
}

fn escape_pipe(s: &str) -> String {
    s.replace('|', "\\|")
}

fn quote(out: &mut String, text: &str) {
    for line in text.lines() {
        out.push_str(&format!("> {}\n", line));
    }
}

/// Render a report as Markdown.
pub fn convert_to_markdown(report: &AuditReport, config: &MarkdownConfig) -> String {
    let mut out = format!("# AEO Audit\n\n**URL:** {}\n\n", report.analysis.source_url());

    let analysis = match &report.analysis {
        AnalysisRecord::Success(analysis) => analysis,
        AnalysisRecord::Failure { error_message, .. } => {
            out.push_str(&format!("**Error:** {}\n", error_message));
            return out;
        }
    };

    if !analysis.page_title.is_empty() {
        out.push_str(&format!("**Title:** {}\n\n", analysis.page_title));
    }
    out.push_str(&format!("**Word count:** {}\n\n", analysis.total_word_count));

    let answer = &analysis.answer;
    out.push_str(&format!(
        "## Direct answer: {}/100 ({})\n\n",
        answer.score,
        ScoreBand::from_score(answer.score)
    ));
    for reason in &answer.reasons {
        let mark = if is_negative_reason(reason) { "[ ]" } else { "[x]" };
        out.push_str(&format!("- {} {}\n", mark, reason));
    }
    out.push('\n');

    if !analysis.first_paragraph_text.is_empty() {
        out.push_str("### First paragraph\n\n");
        quote(&mut out, &analysis.first_paragraph_text);
        out.push('\n');
    }

    let source = if analysis.queries_ai_generated { "AI-generated" } else { "rule-based" };
    out.push_str(&format!("## Queries ({})\n\n", source));
    for (i, query) in analysis.generated_queries.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, query));
    }
    out.push('\n');

    if let (Some(results), Some(summary)) = (&report.citations, &report.citation_summary) {
        out.push_str(&format!("## Citations ({:.0}%)\n\n", summary.citation_rate));
        out.push_str("| Query | Cited | Sources |\n|-------|-------|---------|\n");
        for result in results {
            let cited = match (&result.error, result.cited) {
                (Some(_), _) => "error",
                (None, true) => "yes",
                (None, false) => "no",
            };
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_pipe(&result.query),
                cited,
                result.sources_found.len()
            ));
        }
        out.push('\n');
    }

    if let Some(err) = &report.citations_error {
        out.push_str(&format!("## Citations\n\n_Not checked: {}_\n\n", err));
    }

    if let Some(recommendations) = &report.recommendations {
        out.push_str("## Recommendations\n\n");
        for rec in recommendations {
            out.push_str(&format!("- {}\n", rec));
        }
        out.push('\n');
    }

    if let Some(err) = &report.recommendations_error {
        out.push_str(&format!("## Recommendations\n\n_Unavailable: {}_\n\n", err));
    }

    if config.include_preview && !analysis.leading_window_text.is_empty() {
        out.push_str("## Content preview\n\n");
        quote(&mut out, &analysis.leading_window_text);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuditError;
    use crate::citation::CitationResult;
    use crate::record::PageAnalysis;
    use crate::scoring::DirectAnswer;

    fn report() -> AuditReport {
        AuditReport::new(AnalysisRecord::Success(PageAnalysis {
            source_url: "https://example.com".into(),
            page_title: "Example".into(),
            total_word_count: 3,
            leading_window_text: "Example body text".into(),
            first_paragraph_text: "Example body text that is long enough.".into(),
            answer: DirectAnswer {
                verdict: true,
                score: 75,
                reasons: vec!["Contains specific numbers/data".into(), "Contains promotional language".into()],
            },
            generated_queries: vec!["q1".into(), "q2".into(), "q3".into()],
            queries_ai_generated: true,
        }))
    }

    #[test]
    fn test_markdown_report() {
        let md = convert_to_markdown(&report(), &MarkdownConfig::default());
        assert!(md.starts_with("# AEO Audit\n\n**URL:** https://example.com\n"));
        assert!(md.contains("## Direct answer: 75/100 (Good)"));
        assert!(md.contains("- [x] Contains specific numbers/data"));
        assert!(md.contains("- [ ] Contains promotional language"));
        assert!(md.contains("> Example body text that is long enough."));
        assert!(md.contains("## Queries (AI-generated)\n\n1. q1\n2. q2\n3. q3"));
        assert!(!md.contains("Content preview"));
    }

    #[test]
    fn test_markdown_citation_table() {
        let report = report().with_citations(vec![CitationResult::from_answer(
            "a | b",
            "https://example.com",
            "text",
            vec!["https://other.test".into()],
        )]);
        let md = MarkdownFormatter::new(MarkdownConfig { include_preview: true }).convert(&report);
        assert!(md.contains("## Citations (0%)"));
        assert!(md.contains("| a \\| b | no | 1 |"));
        assert!(md.contains("## Content preview\n\n> Example body text"));
    }

    #[test]
    fn test_markdown_failure() {
        let report = AuditReport::new(AnalysisRecord::failure("u", "Could not connect"));
        let md = convert_to_markdown(&report, &MarkdownConfig::default());
        assert!(md.ends_with("**Error:** Could not connect\n"));
    }

    #[test]
    fn test_markdown_follow_up_errors() {
        let report = report().with_recommendations_error(&AuditError::NoRecommendations);
        let md = convert_to_markdown(&report, &MarkdownConfig::default());
        assert!(md.contains("## Direct answer: 75/100 (Good)"));
        assert!(md.contains("## Recommendations\n\n_Unavailable: Could not parse recommendations from response_"));
        assert!(!md.contains("## Citations"));
    }
}
