//! Traversal and run result models.

use serde::{Deserialize, Serialize};

use super::Record;

/// Why a single query's traversal stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The last fetched page had no next-page link
    NoNextLink,
    /// The configured page ceiling was reached
    PageLimit,
    /// Fetching the given page failed after all retries
    FetchFailed { page: usize },
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::NoNextLink => write!(f, "no next page"),
            StopReason::PageLimit => write!(f, "page limit reached"),
            StopReason::FetchFailed { page } => write!(f, "fetch failed on page {}", page),
        }
    }
}

/// Outcome of one query's traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    /// Records in page order, then document order within a page
    pub records: Vec<Record>,

    /// Number of pages successfully fetched
    pub pages_fetched: usize,

    /// Why the traversal ended
    pub stop: StopReason,
}

impl Traversal {
    /// Whether the traversal ended early because of a fetch failure
    pub fn is_partial(&self) -> bool {
        matches!(self.stop, StopReason::FetchFailed { .. })
    }
}

/// Aggregated result of a whole run
///
/// `flat` is always the concatenation of `by_query` in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Query strings in input order
    pub queries: Vec<String>,

    /// All records, queries concatenated in input order
    pub flat: Vec<Record>,

    /// One record list per input query
    pub by_query: Vec<Vec<Record>>,
}

impl RunResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one query's records to both views
    pub fn push(&mut self, query: impl Into<String>, records: Vec<Record>) {
        self.queries.push(query.into());
        self.flat.extend(records.iter().cloned());
        self.by_query.push(records);
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    /// Whether no records were collected at all
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// Iterate over `(query, records)` sections in input order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.queries
            .iter()
            .map(String::as_str)
            .zip(self.by_query.iter().map(Vec::as_slice))
    }
}
