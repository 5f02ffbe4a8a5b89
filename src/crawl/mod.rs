//! The crawl pipeline: fetch a page, extract records, follow the next link.
//!
//! - [`PageFetcher`]: renders one URL with bounded retries
//! - [`RecordExtractor`]: pulls records and the next-page link out of HTML
//! - [`PaginationDriver`]: walks the pages of one query
//! - [`QueryOrchestrator`]: runs a list of queries into a [`RunResult`](crate::models::RunResult)

mod extractor;
mod fetcher;
mod orchestrator;
mod pagination;

pub use extractor::{parse_citation_count, CompiledSelectors, RecordExtractor};
pub use fetcher::{FetchError, PageFetcher};
pub use orchestrator::{parse_queries, QueryOrchestrator};
pub use pagination::PaginationDriver;
