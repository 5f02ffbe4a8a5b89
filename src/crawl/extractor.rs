//! Record extraction from a results page.
//!
//! Extraction is total: missing elements degrade to empty strings, an absent
//! link or a zero citation count. Empty or malformed markup yields no records.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::config::{ConfigError, SelectorConfig};
use crate::models::{Record, RecordBuilder};

/// First run of ASCII digits; the citation count heuristic
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is a valid regex"));

/// Selectors compiled from a [`SelectorConfig`]
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    result: Selector,
    title: Selector,
    authors: Selector,
    abstract_text: Selector,
    footer_links: Selector,
    next_page: Selector,
}

impl CompiledSelectors {
    /// Compile every selector, reporting the first invalid one
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            result: parse_selector("result", &config.result)?,
            title: parse_selector("title", &config.title)?,
            authors: parse_selector("authors", &config.authors)?,
            abstract_text: parse_selector("abstract", &config.abstract_text)?,
            footer_links: parse_selector("footer_links", &config.footer_links)?,
            next_page: parse_selector("next_page", &config.next_page)?,
        })
    }
}

fn parse_selector(name: &str, css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css)
        .map_err(|e| ConfigError::Invalid(format!("selectors.{} {:?}: {}", name, css, e)))
}

/// Extracts records and the next-page link from results pages
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    selectors: CompiledSelectors,
    base_url: Url,
}

impl RecordExtractor {
    /// Create an extractor; `base_url` resolves relative pagination links
    pub fn new(selectors: &SelectorConfig, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::Invalid(format!("base url {:?}: {}", base_url, e)))?;

        Ok(Self {
            selectors: CompiledSelectors::compile(selectors)?,
            base_url,
        })
    }

    /// All records on the page, in document order
    pub fn extract(&self, html: &str) -> Vec<Record> {
        let document = Html::parse_document(html);
        self.records_in(&document)
    }

    /// Href of the last "next" pagination anchor, resolved against the base URL
    pub fn find_next_page_link(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        self.next_link_in(&document)
    }

    /// Records and next-page link from a single parse of the page
    pub fn extract_page(&self, html: &str) -> (Vec<Record>, Option<String>) {
        let document = Html::parse_document(html);
        (self.records_in(&document), self.next_link_in(&document))
    }

    fn records_in(&self, document: &Html) -> Vec<Record> {
        document
            .select(&self.selectors.result)
            .map(|block| self.parse_block(&block))
            .collect()
    }

    fn parse_block(&self, block: &ElementRef) -> Record {
        let link = block
            .select(&self.selectors.title)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string);

        let footer = block
            .select(&self.selectors.footer_links)
            .next()
            .map(|a| a.text().collect::<String>())
            .unwrap_or_default();

        RecordBuilder::new(select_text(block, &self.selectors.title))
            .authors(select_text(block, &self.selectors.authors))
            .abstract_text(select_text(block, &self.selectors.abstract_text))
            .maybe_link(link)
            .citation_count(parse_citation_count(&footer))
            .build()
    }

    fn next_link_in(&self, document: &Html) -> Option<String> {
        let href = document
            .select(&self.selectors.next_page)
            .last()?
            .value()
            .attr("href")?;

        self.base_url.join(href.trim()).ok().map(String::from)
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(&SelectorConfig::default(), "https://scholar.google.com")
            .expect("built-in selectors are valid")
    }
}

/// Concatenated text of every match, trimmed
fn select_text(block: &ElementRef, selector: &Selector) -> String {
    block
        .select(selector)
        .flat_map(|e| e.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// First number in `text`, or 0 when there is none or it does not fit
pub fn parse_citation_count(text: &str) -> u32 {
    DIGITS
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
