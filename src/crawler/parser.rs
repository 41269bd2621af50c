//! HTML page extractor
//!
//! This module turns a fetched HTML document into `PageFacts`:
//! - Page title and meta description (with fixed fallbacks)
//! - Favicon URL
//! - Image URLs
//! - Outbound links eligible for further crawling
//!
//! Extraction never fails. Malformed or incomplete HTML degrades to the
//! default values below.

use crate::url::{absolute_http_url, resolve_against};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Title used when a page has no non-empty `<title>`
pub const DEFAULT_TITLE: &str = "No title";

/// Description used when a page has no non-empty meta description
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Structured facts extracted from an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFacts {
    /// Text of the first `<title>`, or `DEFAULT_TITLE`
    pub title: String,

    /// Content of `<meta name="description">`, or `DEFAULT_DESCRIPTION`
    pub description: String,

    /// Absolute favicon URL, or an empty string
    pub favicon: String,

    /// Absolute image URLs in order of first appearance, without duplicates
    pub images: Vec<String>,

    /// Absolute http(s) links in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts page facts
///
/// # Extraction Rules
///
/// - `title`: first `<title>` text, trimmed
/// - `description`: `content` of `<meta name="description">`
/// - `favicon`: `href` of `<link rel="icon">`, else `<link rel="shortcut icon">`,
///   resolved against `base_url`
/// - `images`: every `<img src>`, resolved against `base_url`
/// - `links`: every `<a href>` that is already an absolute http(s) URL;
///   relative links are not traversal candidates
///
/// # Example
///
/// ```
/// use linkwalker::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><img src="/a.png"></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let facts = extract_page(html, &base_url);
/// assert_eq!(facts.title, "Test");
/// assert_eq!(facts.images, vec!["https://example.com/a.png".to_string()]);
/// ```
pub fn extract_page(html: &str, base_url: &Url) -> PageFacts {
    let document = Html::parse_document(html);

    PageFacts {
        title: extract_title(&document).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: extract_description(&document)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        favicon: extract_favicon(&document, base_url).unwrap_or_default(),
        images: extract_images(&document, base_url),
        links: extract_links(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `rel="icon"` wins over `rel="shortcut icon"` regardless of document order
fn extract_favicon(document: &Html, base_url: &Url) -> Option<String> {
    ["link[rel=\"icon\"]", "link[rel=\"shortcut icon\"]"]
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .filter(|href| !href.trim().is_empty())
                .map(str::to_string)
        })
        .and_then(|href| resolve_against(&href, base_url))
}

fn extract_images(document: &Html, base_url: &Url) -> Vec<String> {
    let mut images = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(img_selector) = Selector::parse("img[src]") {
        for element in document.select(&img_selector) {
            let Some(src) = element.value().attr("src") else {
                continue;
            };
            if let Some(absolute) = resolve_against(src, base_url) {
                if seen.insert(absolute.clone()) {
                    images.push(absolute);
                }
            }
        }
    }

    images
}

/// Extracts traversal candidates from `<a href>` tags
fn extract_links(document: &Html) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = absolute_http_url(href) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}
