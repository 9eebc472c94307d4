use crate::Result;
use crate::record::AuditReport;

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
}

/// Serialize a report. The analysis is tagged with `status`; citation and
/// recommendation fields are present only when they were requested.
pub fn convert_to_json(report: &AuditReport, config: &JsonConfig) -> Result<String> {
    let json = if config.pretty { serde_json::to_string_pretty(report)? } else { serde_json::to_string(report)? };
    Ok(json)
}

/// JSON report renderer
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, report: &AuditReport) -> Result<String> {
        convert_to_json(report, &self.config)
    }
}
