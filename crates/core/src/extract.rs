//! Main-content extraction.
//!
//! Turns raw markup into a page title, the ordered candidate text blocks and
//! a single normalized full-text string.

use std::sync::LazyLock;

use regex::Regex;

use crate::Result;
use crate::parse::{Document, Element};
use crate::preprocess::PreprocessConfig;

/// Class/id fragments that mark a likely article container.
static CONTAINER_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(content|article|post)").unwrap());

/// Landmarks tried in order before the class/id scan.
const LANDMARK_SELECTORS: &[&str] = &["main", "article", r#"[role="main"]"#];

/// Elements whose text becomes a candidate paragraph.
const PARAGRAPH_SELECTOR: &str = "p, h1, h2, h3, li";

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Blocks must be strictly longer than this many characters
    pub min_paragraph_chars: usize,
    /// Pre-extraction cleanup
    pub preprocess: PreprocessConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { min_paragraph_chars: 20, preprocess: PreprocessConfig::default() }
    }
}

/// The result of content extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    /// All text under the content root, whitespace collapsed
    pub full_text: String,
    /// Trimmed `<title>` text, or empty
    pub title: String,
    /// Candidate text blocks in document order
    pub paragraphs: Vec<String>,
}

impl ExtractedContent {
    /// First candidate block, or empty when the page had none.
    pub fn first_paragraph(&self) -> &str {
        self.paragraphs.first().map(String::as_str).unwrap_or("")
    }
}

/// Which rule picked the content root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Main,
    Article,
    RoleMain,
    Container,
    Body,
    Document,
}

/// Pick the element most likely to hold the article body.
///
/// First match wins: `<main>`, `<article>`, `[role="main"]`, the first `<div>`
/// whose class or id mentions content/article/post, `<body>`, then the whole
/// document.
pub fn select_content_root(doc: &Document) -> Result<(RootKind, Element<'_>)> {
    let kinds = [RootKind::Main, RootKind::Article, RootKind::RoleMain];
    for (kind, selector) in kinds.into_iter().zip(LANDMARK_SELECTORS) {
        if let Some(element) = doc.select_first(selector)? {
            return Ok((kind, element));
        }
    }

    let container = doc.select("div")?.into_iter().find(|div| {
        div.attr("class").is_some_and(|c| CONTAINER_PATTERN.is_match(c))
            || div.attr("id").is_some_and(|id| CONTAINER_PATTERN.is_match(id))
    });
    if let Some(element) = container {
        return Ok((RootKind::Container, element));
    }

    if let Some(body) = doc.select_first("body")? {
        return Ok((RootKind::Body, body));
    }

    Ok((RootKind::Document, doc.root()))
}

/// Extract title, candidate paragraphs and full text from raw markup.
pub fn extract_content(html: &str) -> Result<ExtractedContent> {
    extract_content_with_config(html, &ExtractConfig::default())
}

/// Extract content with custom configuration
pub fn extract_content_with_config(html: &str, config: &ExtractConfig) -> Result<ExtractedContent> {
    let doc = Document::parse_with_preprocessing(html, &config.preprocess)?;
    let title = doc.title().unwrap_or_default();

    let (kind, root) = select_content_root(&doc)?;
    tracing::debug!(root = ?kind, tag = %root.tag_name(), "selected content root");

    let paragraphs = root
        .select(PARAGRAPH_SELECTOR)?
        .iter()
        .map(Element::collapsed_text)
        .filter(|text| text.chars().count() > config.min_paragraph_chars)
        .collect::<Vec<_>>();

    let full_text = root.normalized_text();

    Ok(ExtractedContent { full_text, title, paragraphs })
}
