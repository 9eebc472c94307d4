//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the DOM tree using CSS selectors.
//!
//! # Example
//!
//! ```rust
//! use aeo_audit_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><title>Title</title></head>
//!         <body><p class="content">Paragraph</p></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! assert_eq!(doc.title(), Some("Title".to_string()));
//! assert_eq!(doc.select("p.content").unwrap().len(), 1);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::preprocess::{PreprocessConfig, preprocess_html};
use crate::{AuditError, Result};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AuditError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string without preprocessing.
    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self { html: Html::parse_document(html) })
    }

    /// Parses HTML after stripping non-content elements.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aeo_audit_core::parse::Document;
    /// use aeo_audit_core::PreprocessConfig;
    ///
    /// let html = "<html><body><nav>Menu</nav><p>Content</p></body></html>";
    /// let doc = Document::parse_with_preprocessing(html, &PreprocessConfig::default()).unwrap();
    /// assert!(!doc.root().text().contains("Menu"));
    /// ```
    pub fn parse_with_preprocessing(html: &str, config: &PreprocessConfig) -> Result<Self> {
        let cleaned = preprocess_html(html, config);
        Self::parse(&cleaned)
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The document's root element (`<html>`).
    pub fn root(&self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// First element matching a CSS selector, in document order.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the title of the document.
    ///
    /// Returns the trimmed content of the first `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }
}

/// A wrapper around scraper's ElementRef.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the raw concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Text content with whitespace collapsed and trimmed.
    ///
    /// Adjacent text nodes are concatenated as is, so `fast</b>.` stays `fast.`.
    pub fn collapsed_text(&self) -> String {
        collapse_whitespace(&self.text())
    }

    /// Text nodes joined with single spaces, whitespace collapsed and trimmed.
    pub fn normalized_text(&self) -> String {
        let joined = self
            .element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        collapse_whitespace(&joined)
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}
