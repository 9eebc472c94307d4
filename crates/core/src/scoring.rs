//! Direct-answer scoring.
//!
//! The rubric is an ordered table of checks applied to the first substantial
//! text block of a page. Each check may add points and may append one reason;
//! the table order is the order reasons appear in the result.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::metrics::count_words;

/// Score at or above which a block is treated as a direct answer.
pub const DIRECT_ANSWER_THRESHOLD: u8 = 50;

/// Upper bound of the score.
pub const MAX_SCORE: u8 = 100;

/// Reason emitted when there is nothing to score.
pub const NO_PARAGRAPH_REASON: &str = "No first paragraph found";

const DEFINITIVE_OPENERS: &[&str] = &["the ", "a ", "an ", "it ", "this ", "there "];

const WEAK_OPENERS: &[&str] =
    &["in this article", "in this post", "welcome to", "today we", "let's", "click here", "subscribe"];

const PROMO_WORDS: &[&str] = &["buy", "purchase", "discount", "sale", "offer", "deal", "subscribe"];

static DEFINING_LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(is|are|means|refers to|defined as|known as|called)\b").unwrap());

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

/// Outcome of scoring a first paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectAnswer {
    /// `score >= 50`
    pub verdict: bool,
    /// Clamped to `0..=100`
    pub score: u8,
    /// One entry per check that reported, in rubric order
    pub reasons: Vec<String>,
}

impl DirectAnswer {
    fn empty() -> Self {
        Self { verdict: false, score: 0, reasons: vec![NO_PARAGRAPH_REASON.to_string()] }
    }
}

/// Text under evaluation, with the derived forms every check needs.
#[derive(Debug)]
pub struct Subject<'a> {
    pub text: &'a str,
    pub lower: String,
    pub word_count: usize,
}

impl<'a> Subject<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, lower: text.to_lowercase(), word_count: count_words(text) }
    }
}

/// Points and reason contributed by one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub points: u8,
    pub reason: String,
}

impl Finding {
    fn new(points: u8, reason: impl Into<String>) -> Self {
        Self { points, reason: reason.into() }
    }
}

/// One row of the rubric.
pub struct Check {
    pub name: &'static str,
    pub evaluate: fn(&Subject<'_>) -> Option<Finding>,
}

/// The rubric, in evaluation order.
pub const RUBRIC: &[Check] = &[
    Check { name: "length", evaluate: check_length },
    Check { name: "definitive_opening", evaluate: check_definitive_opening },
    Check { name: "defining_language", evaluate: check_defining_language },
    Check { name: "no_weak_opening", evaluate: check_weak_opening },
    Check { name: "specific_data", evaluate: check_digits },
    Check { name: "not_promotional", evaluate: check_promotional },
];

fn check_length(subject: &Subject<'_>) -> Option<Finding> {
    let n = subject.word_count;
    Some(match n {
        20..=100 => Finding::new(25, format!("Good length ({n} words) - concise but informative")),
        0..20 => Finding::new(0, format!("Too short ({n} words) - may lack detail")),
        _ => Finding::new(10, format!("Long first paragraph ({n} words) - consider being more concise")),
    })
}

/// A question earns an explicit note. A statement that does not open with a
/// definitive word earns nothing and reports nothing.
fn check_definitive_opening(subject: &Subject<'_>) -> Option<Finding> {
    if subject.text.trim().ends_with('?') {
        return Some(Finding::new(0, "First paragraph is a question, not an answer"));
    }

    DEFINITIVE_OPENERS
        .iter()
        .any(|opener| subject.lower.starts_with(opener))
        .then(|| Finding::new(20, "Starts with a definitive statement"))
}

fn check_defining_language(subject: &Subject<'_>) -> Option<Finding> {
    DEFINING_LANGUAGE
        .is_match(subject.text)
        .then(|| Finding::new(20, "Contains defining language (is, are, means, etc.)"))
}

fn check_weak_opening(subject: &Subject<'_>) -> Option<Finding> {
    if WEAK_OPENERS.iter().any(|phrase| subject.lower.starts_with(phrase)) {
        Some(Finding::new(0, "Starts with weak/promotional phrase - get to the answer faster"))
    } else {
        Some(Finding::new(15, "Doesn't start with weak/promotional phrases"))
    }
}

fn check_digits(subject: &Subject<'_>) -> Option<Finding> {
    DIGIT.is_match(subject.text).then(|| Finding::new(10, "Contains specific numbers/data"))
}

fn check_promotional(subject: &Subject<'_>) -> Option<Finding> {
    if PROMO_WORDS.iter().any(|word| subject.lower.contains(word)) {
        Some(Finding::new(0, "Contains promotional language"))
    } else {
        Some(Finding::new(10, "Not promotional - focused on information"))
    }
}

/// Score how well `first_paragraph` reads as a direct answer.
///
/// # Example
///
/// ```rust
/// use aeo_audit_core::score_direct_answer;
///
/// let result = score_direct_answer("");
/// assert_eq!(result.score, 0);
/// assert_eq!(result.reasons, vec!["No first paragraph found".to_string()]);
/// ```
pub fn score_direct_answer(first_paragraph: &str) -> DirectAnswer {
    if first_paragraph.is_empty() {
        return DirectAnswer::empty();
    }

    let subject = Subject::new(first_paragraph);
    let mut total: u32 = 0;
    let mut reasons = Vec::new();

    for check in RUBRIC {
        if let Some(finding) = (check.evaluate)(&subject) {
            tracing::trace!(check = check.name, points = finding.points, "rubric check reported");
            total += u32::from(finding.points);
            reasons.push(finding.reason);
        }
    }

    let score = total.min(u32::from(MAX_SCORE)) as u8;
    DirectAnswer { verdict: score >= DIRECT_ANSWER_THRESHOLD, score, reasons }
}
