//! Page extractor
//!
//! Turns a rendered DOM snapshot into the structured fields the pipeline
//! needs: title, main text, headings and outbound links.
//!
//! # Extraction Rules
//!
//! **Removed before reading text:** `script`, `style`, `noscript`, `iframe`
//!
//! **Main content:** the first element matching, in order,
//! `main`, `article`, `[role='main']`, `#content`, `#main`, `.content`,
//! `.main`, `.post-content`, `.entry-content`; otherwise `<body>`.
//!
//! **Headings:** `h1`-`h3` in document order, trimmed, empty ones dropped.
//!
//! **Links:** every `<a href>` resolved to an absolute HTTP(S) URL, deduplicated.
//! `javascript:`, `mailto:`, `tel:`, `data:`, fragment-only and `download`
//! links are skipped.

use crate::FaqError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text never counts as page content
const REMOVED_ELEMENTS: &[&str] = &["script", "style", "noscript", "iframe"];

/// Main-content candidates, semantic roles before id/class fallbacks
const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".main",
    ".post-content",
    ".entry-content",
];

/// Elements that start a new line of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Structured fields read from one rendered page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    /// Contents of `<title>`, empty when absent
    pub title: String,

    /// Visible text of the main content element
    pub content: String,

    /// h1-h3 texts in document order
    pub headings: Vec<String>,

    /// Absolute link targets in first-seen order
    pub links: Vec<String>,
}

/// Extracts title, main text, headings and links from an HTML document
///
/// # Example
///
/// ```
/// use faqsmith::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Pricing</title></head>
///     <body><main><h1>Plans</h1><p>Starter is free.</p></main></body></html>"#;
/// let base_url = Url::parse("https://example.com/pricing").unwrap();
/// let page = extract_page(html, &base_url).unwrap();
/// assert_eq!(page.title, "Pricing");
/// assert_eq!(page.headings, vec!["Plans".to_string()]);
/// assert_eq!(page.content, "Plans\nStarter is free.");
/// ```
pub fn extract_page(html: &str, base_url: &Url) -> Result<ExtractedPage, FaqError> {
    let document = Html::parse_document(html);

    Ok(ExtractedPage {
        title: extract_title(&document, base_url)?,
        content: extract_main_content(&document, base_url)?,
        headings: extract_headings(&document, base_url)?,
        links: extract_links(&document, base_url)?,
    })
}

fn selector(css: &str, base_url: &Url) -> Result<Selector, FaqError> {
    Selector::parse(css).map_err(|e| FaqError::Extraction {
        url: base_url.to_string(),
        message: format!("invalid selector '{}': {:?}", css, e),
    })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html, base_url: &Url) -> Result<String, FaqError> {
    let title_selector = selector("title", base_url)?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(|element| inline_text(element))
        .unwrap_or_default())
}

/// Picks the main content element and returns its visible text
fn extract_main_content(document: &Html, base_url: &Url) -> Result<String, FaqError> {
    for css in MAIN_CONTENT_SELECTORS {
        let candidate = selector(css, base_url)?;
        if let Some(element) = document.select(&candidate).next() {
            return Ok(visible_text(element));
        }
    }

    let body_selector = selector("body", base_url)?;
    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    Ok(visible_text(root))
}

/// Collects h1-h3 headings in document order
fn extract_headings(document: &Html, base_url: &Url) -> Result<Vec<String>, FaqError> {
    let heading_selector = selector("h1, h2, h3", base_url)?;

    Ok(document
        .select(&heading_selector)
        .map(inline_text)
        .filter(|text| !text.is_empty())
        .collect())
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Result<Vec<String>, FaqError> {
    let a_selector = selector("a[href]", base_url)?;
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    Ok(links)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}

/// Visible text of an element, one line per block, removed elements skipped
fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();

    for node in element.descendants() {
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| REMOVED_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        if let Some(text) = node.value().as_text() {
            raw.push_str(text);
        } else if let Some(el) = node.value().as_element() {
            if BLOCK_ELEMENTS.contains(&el.name()) {
                raw.push('\n');
            }
        }
    }

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of an element on a single line
fn inline_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
