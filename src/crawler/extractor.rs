//! HTML content extraction
//!
//! This module turns a fetched page into the two things the pipeline needs:
//! - Cleaned visible text, capped at a character budget
//! - Same-domain candidate links, capped at a count budget
//!
//! Parsing is lenient: the HTML5 parser recovers from malformed markup and
//! extraction never fails, it only returns less.

use crate::url::{normalize_parsed, DomainScope};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "nav", "header", "footer",
];

/// Link targets that are never HTML pages
const SKIPPED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".zip", ".gz", ".mp3",
    ".mp4", ".avi", ".mov",
];

/// Budgets applied by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorLimits {
    /// Maximum characters of text kept; excess is dropped silently
    pub max_text_chars: usize,

    /// Maximum links kept, in document order
    pub max_links: usize,
}

impl Default for ExtractorLimits {
    fn default() -> Self {
        Self {
            max_text_chars: 100_000,
            max_links: 5,
        }
    }
}

/// Text and links recovered from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Visible text with whitespace collapsed
    pub text: String,

    /// Normalized same-domain links, deduplicated, in document order
    pub links: Vec<Url>,
}

/// Extracts text and same-domain links from HTML
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    scope: DomainScope,
    limits: ExtractorLimits,
}

impl ContentExtractor {
    /// Creates an extractor bound to one crawl's domain scope
    pub fn new(scope: DomainScope, limits: ExtractorLimits) -> Self {
        Self { scope, limits }
    }

    /// Parses a page and extracts its text and links
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:**
    /// - `<a href="...">` resolved against `base_url`, on the seed's site
    ///
    /// **Exclude:**
    /// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
    /// - Fragment-only anchors and `download` anchors
    /// - Links back to the page itself
    /// - Obvious binary assets (PDFs, images, archives, media)
    /// - Anything past the first `max_links` survivors
    ///
    /// # Example
    ///
    /// ```
    /// use sitescout::crawler::{ContentExtractor, ExtractorLimits};
    /// use sitescout::url::DomainScope;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://example.com/").unwrap();
    /// let scope = DomainScope::for_seed(&base, false).unwrap();
    /// let extractor = ContentExtractor::new(scope, ExtractorLimits::default());
    ///
    /// let html = r#"<html><body><p>Acme   Corp</p><a href="/contact">Contact</a></body></html>"#;
    /// let content = extractor.extract(html, &base);
    /// assert_eq!(content.text, "Acme Corp Contact");
    /// assert_eq!(content.links[0].as_str(), "https://example.com/contact");
    /// ```
    pub fn extract(&self, html: &str, base_url: &Url) -> ExtractedContent {
        let document = Html::parse_document(html);

        ExtractedContent {
            text: extract_text(&document, self.limits.max_text_chars),
            links: self.extract_links(&document, base_url),
        }
    }

    fn extract_links(&self, document: &Html, base_url: &Url) -> Vec<Url> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let own_url = normalize_parsed(base_url.clone()).ok();
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&selector) {
            if links.len() >= self.limits.max_links {
                break;
            }

            if element.value().attr("download").is_some() {
                continue;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let Some(url) = resolve_link(href, base_url) else {
                continue;
            };

            if !self.scope.contains(&url) {
                tracing::debug!("Skipping off-site link {}", url);
                continue;
            }

            if own_url.as_ref() == Some(&url) || is_binary_asset(&url) {
                continue;
            }

            if seen.insert(url.as_str().to_string()) {
                links.push(url);
            }
        }

        links
    }
}

/// Collects visible text from the document
///
/// Text nodes are joined with single spaces, runs of whitespace collapse to one
/// space, and the result is cut to at most `max_chars` characters.
pub fn extract_text(document: &Html, max_chars: usize) -> String {
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(collapsed, max_chars)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push(' ');
                out.push_str(text);
            }
            Node::Element(el) if !SKIPPED_ELEMENTS.contains(&el.name()) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text,
    }
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only anchors
/// - invalid URLs
/// - non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    normalize_parsed(absolute_url).ok()
}

fn is_binary_asset(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
