//! HTML parser for extracting links, title and text
//!
//! Each fetch parses its own `PageDocument`; documents are plain owned data
//! and are never shared between fetches.

use crate::url::normalize_link;
use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use std::collections::HashSet;

/// A downloaded page reduced to what the engine needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDocument {
    title: String,
    text: String,
    hrefs: Vec<String>,
}

impl PageDocument {
    /// Parses an HTML document
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_trail::crawler::PageDocument;
    ///
    /// let html = r#"<html><head><title> Test
    ///   Page </title></head><body><a href="/next">Next</a></body></html>"#;
    /// let doc = PageDocument::parse(html);
    /// assert_eq!(doc.title(), "Test Page");
    /// assert_eq!(doc.extract_links("https://example.com/"), vec!["https://example.com/next"]);
    /// ```
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        Self {
            title: extract_title(&document),
            text: extract_body_text(&document),
            hrefs: extract_hrefs(&document),
        }
    }

    /// Whitespace-normalized `<title>` text, empty when absent
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whitespace-normalized body text
    pub fn extract_text(&self) -> &str {
        &self.text
    }

    /// Raw `href` values of all anchors, in document order
    pub fn hrefs(&self) -> &[String] {
        &self.hrefs
    }

    /// Returns true if `keyword` appears as a whole word in the body text
    ///
    /// A blank keyword never matches.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        match KeywordMatcher::new(keyword) {
            Ok(Some(matcher)) => matcher.is_match(self),
            _ => false,
        }
    }

    /// Normalized, page-locally deduplicated links in document order
    ///
    /// References that fail normalization are skipped.
    pub fn extract_links(&self, current_url: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for href in &self.hrefs {
            match normalize_link(href, current_url) {
                Ok(link) => {
                    if seen.insert(link.clone()) {
                        links.push(link);
                    }
                }
                Err(e) => tracing::trace!("Skipping link '{}' on {}: {}", href, current_url, e),
            }
        }

        links
    }
}

/// Case-insensitive whole-word matcher for the stop keyword
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keyword: String,
    pattern: Regex,
}

impl KeywordMatcher {
    /// Builds a matcher; blank keywords yield `None` (keyword check disabled)
    pub fn new(keyword: &str) -> Result<Option<Self>, ConfigError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(None);
        }

        let pattern = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(keyword)))
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::Validation(format!("Invalid keyword '{}': {}", keyword, e)))?;

        Ok(Some(Self {
            keyword: keyword.to_string(),
            pattern,
        }))
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns true if the keyword appears in the document body
    pub fn is_match(&self, document: &PageDocument) -> bool {
        self.pattern.is_match(document.extract_text())
    }
}

/// Collapses every whitespace run to one space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| normalize_whitespace(&element.text().collect::<String>()))
        .unwrap_or_default()
}

fn extract_body_text(document: &Html) -> String {
    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };

    let pieces: Vec<&str> = document
        .select(&body_selector)
        .flat_map(|body| body.text())
        .collect();
    normalize_whitespace(&pieces.join(" "))
}

fn extract_hrefs(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}
