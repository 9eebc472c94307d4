//! Report renderers.

pub mod json;
pub mod markdown;
pub mod text;

pub use json::{JsonConfig, JsonFormatter, convert_to_json};
pub use markdown::{MarkdownConfig, MarkdownFormatter, convert_to_markdown};
pub use text::{TextConfig, TextFormatter, convert_to_text};

use std::fmt;

/// Coarse label for a direct-answer score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    NeedsWork,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => ScoreBand::Good,
            40..70 => ScoreBand::NeedsWork,
            _ => ScoreBand::Poor,
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScoreBand::Good => "Good",
            ScoreBand::NeedsWork => "Needs Work",
            ScoreBand::Poor => "Poor",
        })
    }
}

/// Reasons that report missing points start with one of these.
const NEGATIVE_MARKERS: &[&str] = &["Too short", "Long first", "First paragraph is a question", "Starts with weak", "Contains promotional", "No first paragraph"];

/// Whether a rubric reason describes a weakness.
pub(crate) fn is_negative_reason(reason: &str) -> bool {
    NEGATIVE_MARKERS.iter().any(|marker| reason.starts_with(marker))
}
