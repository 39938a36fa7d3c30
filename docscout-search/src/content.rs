//! HTML content extraction: drops boilerplate and returns readable text.
//!
//! Parses raw HTML, skips non-content elements (scripts, styles,
//! navigation, footers), finds the main content area, and returns clean
//! line-oriented text suitable for LLM consumption. Nothing in the page is
//! ever executed.

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{Result, SearchError};
use crate::format::truncate_at_boundary;

/// Elements whose whole subtree is skipped.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe", "form",
    "template", "button", "select", "head",
];

/// Elements that start a new line in the extracted text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "tbody", "td", "th", "thead", "tr", "ul",
];

/// Content roots tried in priority order.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Marker appended when a page is cut at the per-page limit.
pub const PAGE_TRUNCATED_MARKER: &str = " [content truncated]";

/// Readable text extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Page title from `<title>`, whitespace-collapsed. Empty when absent.
    pub title: String,
    /// Cleaned text, one block per line, no blank lines.
    pub text: String,
    /// Whether the text was cut at the character limit.
    pub truncated: bool,
}

/// Returns true if a response with this `Content-Type` should be parsed.
///
/// A missing header is accepted; servers often omit it for static pages.
pub fn is_textual_content_type(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type else {
        return true;
    };
    let mime = ct
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(
        mime.as_str(),
        "text/html" | "application/xhtml+xml" | "text/plain" | ""
    )
}

/// Extract readable text from raw HTML, keeping at most `max_chars`
/// characters.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content(html: &str, max_chars: usize) -> Result<ExtractedPage> {
    let document = Html::parse_document(html);
    let title = extract_title(&document);
    let raw_text = extract_main_text(&document);
    finish(title, &raw_text, max_chars)
}

/// Clean a `text/plain` body the same way as extracted HTML text.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is blank.
pub fn extract_plain_text(body: &str, max_chars: usize) -> Result<ExtractedPage> {
    finish(String::new(), body, max_chars)
}

fn finish(title: String, raw_text: &str, max_chars: usize) -> Result<ExtractedPage> {
    let text = normalise_whitespace(raw_text);
    if text.is_empty() {
        return Err(SearchError::Parse("no extractable content found".into()));
    }

    let (kept, truncated) = truncate_at_boundary(&text, max_chars, PAGE_TRUNCATED_MARKER);
    Ok(ExtractedPage {
        title,
        text: kept,
        truncated,
    })
}

fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Text of the first content root that yields anything, falling back to
/// the whole document.
fn extract_main_text(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for candidate in document.select(&selector) {
            let mut text = String::new();
            collect_text(candidate, &mut text);
            if !text.trim().is_empty() {
                return text;
            }
        }
    }

    let mut text = String::new();
    collect_text(document.root_element(), &mut text);
    text
}

/// Append the visible text under `element`, skipping boilerplate subtrees
/// and breaking lines around block elements.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child_el.value().name();
                if BOILERPLATE_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Trim every line, collapse runs of inner whitespace, drop blank lines.
fn normalise_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
