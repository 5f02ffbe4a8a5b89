//! Record model representing one search result scraped from a results page.

use serde::{Deserialize, Serialize};

/// A single search result extracted from a results page
///
/// Every field is always present so downstream writers can rely on a fixed
/// shape: text fields default to an empty string and the citation count to
/// zero. Only `link` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Result title
    pub title: String,

    /// Author and venue line, unparsed
    pub authors: String,

    /// Abstract snippet (often truncated by the source)
    pub r#abstract: String,

    /// Target of the title anchor
    pub link: Option<String>,

    /// Citation count, zero when the source shows none
    pub citation_count: u32,
}

impl Record {
    /// Create a record with the given title and every other field defaulted
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Check if the record has a link
    pub fn has_link(&self) -> bool {
        self.link.is_some()
    }

    /// Link as a cell value, empty when absent
    pub fn link_or_empty(&self) -> &str {
        self.link.as_deref().unwrap_or("")
    }
}

/// Builder for constructing Record objects
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Create a new builder with the title set
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            record: Record::new(title),
        }
    }

    /// Set authors
    pub fn authors(mut self, authors: impl Into<String>) -> Self {
        self.record.authors = authors.into();
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.record.r#abstract = abstract_text.into();
        self
    }

    /// Set link
    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.record.link = Some(link.into());
        self
    }

    /// Set link from an optional value
    pub fn maybe_link(mut self, link: Option<String>) -> Self {
        self.record.link = link;
        self
    }

    /// Set citation count
    pub fn citation_count(mut self, count: u32) -> Self {
        self.record.citation_count = count;
        self
    }

    /// Build the Record
    pub fn build(self) -> Record {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = RecordBuilder::new("Attention Is All You Need")
            .authors("A Vaswani, N Shazeer - Advances in neural information processing, 2017")
            .abstract_text("The dominant sequence transduction models...")
            .link("https://arxiv.org/abs/1706.03762")
            .citation_count(42)
            .build();

        assert_eq!(record.title, "Attention Is All You Need");
        assert!(record.has_link());
        assert_eq!(record.citation_count, 42);
    }

    #[test]
    fn test_record_defaults() {
        let record = Record::new("");
        assert_eq!(record.authors, "");
        assert_eq!(record.r#abstract, "");
        assert_eq!(record.link, None);
        assert_eq!(record.link_or_empty(), "");
        assert_eq!(record.citation_count, 0);
    }

    #[test]
    fn test_record_json_shape() {
        let record = RecordBuilder::new("T").citation_count(3).build();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["title"], "T");
        assert_eq!(value["abstract"], "");
        assert_eq!(value["citationCount"], 3);
        assert!(value["link"].is_null());
    }
}
