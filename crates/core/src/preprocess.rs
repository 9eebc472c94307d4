/// Elements that never contribute readable content.
pub const NON_CONTENT_TAGS: &[&str] =
    &["script", "style", "nav", "footer", "header", "aside", "noscript", "iframe", "svg"];

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Tag names removed together with everything inside them
    pub strip_tags: Vec<String>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { strip_tags: NON_CONTENT_TAGS.iter().map(|t| t.to_string()).collect() }
    }
}

/// Remove non-content elements before any text is extracted.
///
/// Stripped elements are removed with their whole subtree, so their text can
/// never leak into word counts or candidate paragraphs. On rewriter failure
/// the input is returned unchanged.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    if config.strip_tags.is_empty() {
        return html.to_string();
    }

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: config
                .strip_tags
                .iter()
                .map(|tag| {
                    let selector: &str = tag.as_str();
                    lol_html::element!(selector, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    if rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}
