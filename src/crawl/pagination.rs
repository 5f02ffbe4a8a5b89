//! Sequential traversal of the result pages of one query.
//!
//! ```text
//! Fetching ──ok──> Extracting ──> CheckingNext ──next link, budget left──> Fetching
//!    │                                 │
//!    └──fetch failed──> Stopped <──────┴──no next link / page limit
//! ```
//!
//! A fetch failure ends the traversal but keeps every record collected from
//! earlier pages.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::{PageFetcher, RecordExtractor};
use crate::config::CrawlConfig;
use crate::models::{Record, StopReason, Traversal};

/// Transient state of one traversal
#[derive(Debug)]
struct PageState {
    page_number: usize,
    current_url: String,
    collected: Vec<Record>,
}

impl PageState {
    fn new(url: String) -> Self {
        Self {
            page_number: 0,
            current_url: url,
            collected: Vec::new(),
        }
    }

    fn advance(&mut self, next_url: String) {
        self.page_number += 1;
        self.current_url = next_url;
    }

    fn finish(self, stop: StopReason, pages_fetched: usize) -> Traversal {
        Traversal {
            records: self.collected,
            pages_fetched,
            stop,
        }
    }
}

/// Drives fetch → extract → next-link across the pages of a single query
#[derive(Debug, Clone)]
pub struct PaginationDriver {
    fetcher: PageFetcher,
    extractor: RecordExtractor,
    max_pages: usize,
    page_delay: Duration,
    base_url: String,
    language: Option<String>,
}

impl PaginationDriver {
    pub fn new(fetcher: PageFetcher, extractor: RecordExtractor, crawl: &CrawlConfig) -> Self {
        Self {
            fetcher,
            extractor,
            max_pages: crawl.max_pages.max(1),
            page_delay: crawl.page_delay(),
            base_url: crawl.base_url.trim_end_matches('/').to_string(),
            language: crawl.language.clone(),
        }
    }

    /// URL of the first results page for `query`
    pub fn search_url(&self, query: &str) -> String {
        let mut url = format!("{}/scholar?q={}", self.base_url, urlencoding::encode(query));
        if let Some(lang) = &self.language {
            url.push_str("&hl=");
            url.push_str(&urlencoding::encode(lang));
        }
        url
    }

    /// Records of every page reachable for `query`, in page then document order
    pub async fn collect(&self, query: &str) -> Vec<Record> {
        self.traverse(query).await.records
    }

    /// Walk the result pages of `query` until there is no next page, the page
    /// limit is reached, or a page cannot be fetched
    pub async fn traverse(&self, query: &str) -> Traversal {
        let mut state = PageState::new(self.search_url(query));

        loop {
            let html = match self.fetcher.fetch(&state.current_url).await {
                Ok(html) => html,
                Err(e) => {
                    error!(
                        query,
                        page = state.page_number,
                        "Error processing page {} for query {:?}: {}",
                        state.page_number,
                        query,
                        e
                    );
                    let fetched = state.page_number;
                    return state.finish(
                        StopReason::FetchFailed {
                            page: fetched,
                        },
                        fetched,
                    );
                }
            };
            let fetched = state.page_number + 1;

            let (records, next_link) = self.extractor.extract_page(&html);
            debug!(
                query,
                page = state.page_number,
                "Extracted {} records from {}",
                records.len(),
                state.current_url
            );
            state.collected.extend(records);

            let Some(next_url) = next_link else {
                return state.finish(StopReason::NoNextLink, fetched);
            };
            if fetched >= self.max_pages {
                info!(
                    query,
                    "Page limit of {} reached for query {:?}", self.max_pages, query
                );
                return state.finish(StopReason::PageLimit, fetched);
            }

            state.advance(next_url);
            sleep(self.page_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mock::results_page;
    use crate::render::MockRenderer;
    use crate::utils::RetryPolicy;
    use std::sync::Arc;

    fn driver(mock: &Arc<MockRenderer>, max_pages: usize, max_retries: u32) -> PaginationDriver {
        let crawl = CrawlConfig {
            max_pages,
            max_retries,
            retry_delay_ms: 0,
            delay_between_requests_ms: 0,
            ..Default::default()
        };
        PaginationDriver::new(
            PageFetcher::new(mock.clone(), RetryPolicy::fixed(max_retries, Duration::ZERO)),
            RecordExtractor::default(),
            &crawl,
        )
    }

    fn paced_driver(mock: &Arc<MockRenderer>, max_pages: usize, delay_ms: u64) -> PaginationDriver {
        let crawl = CrawlConfig {
            max_pages,
            delay_between_requests_ms: delay_ms,
            ..Default::default()
        };
        PaginationDriver::new(
            PageFetcher::new(mock.clone(), RetryPolicy::fixed(1, Duration::ZERO)),
            RecordExtractor::default(),
            &crawl,
        )
    }

    fn titles(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_search_url_encodes_query() {
        let mock = Arc::new(MockRenderer::new());
        let driver = driver(&mock, 1, 1);
        assert_eq!(
            driver.search_url("deep learning & more"),
            "https://scholar.google.com/scholar?q=deep%20learning%20%26%20more"
        );
        assert_eq!(
            driver.search_url(""),
            "https://scholar.google.com/scholar?q="
        );
    }

    #[test]
    fn test_search_url_with_language() {
        let mock = Arc::new(MockRenderer::new());
        let crawl = CrawlConfig {
            language: Some("en".to_string()),
            ..Default::default()
        };
        let driver = PaginationDriver::new(
            PageFetcher::new(mock, RetryPolicy::default()),
            RecordExtractor::default(),
            &crawl,
        );
        assert_eq!(
            driver.search_url("rust"),
            "https://scholar.google.com/scholar?q=rust&hl=en"
        );
    }

    #[tokio::test]
    async fn test_single_page_limit_fetches_once() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_page(results_page(
            &[("p0a", "Cited by 1"), ("p0b", "")],
            Some("/scholar?start=10&q=x"),
        ))
        .push_page(results_page(&[("p1a", "")], None));

        let traversal = driver(&mock, 1, 3).traverse("x").await;

        assert_eq!(mock.call_count(), 1);
        assert_eq!(titles(&traversal.records), vec!["p0a", "p0b"]);
        assert_eq!(traversal.stop, StopReason::PageLimit);
        assert_eq!(traversal.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_never_exceeds_max_pages() {
        let mock = Arc::new(MockRenderer::new());
        for i in 0..10 {
            let title = format!("p{}", i);
            mock.push_page(results_page(&[(title.as_str(), "")], Some("/scholar?start=10")));
        }

        let traversal = driver(&mock, 4, 1).traverse("x").await;

        assert_eq!(mock.call_count(), 4);
        assert_eq!(titles(&traversal.records), vec!["p0", "p1", "p2", "p3"]);
        assert_eq!(traversal.stop, StopReason::PageLimit);
    }

    #[tokio::test]
    async fn test_stops_when_next_link_missing() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_page(results_page(&[("p0", "")], Some("/scholar?start=10&q=x")))
            .push_page(results_page(&[("p1a", ""), ("p1b", "")], None))
            .push_page(results_page(&[("never", "")], None));

        let traversal = driver(&mock, 10, 1).traverse("x").await;

        assert_eq!(mock.call_count(), 2);
        assert_eq!(titles(&traversal.records), vec!["p0", "p1a", "p1b"]);
        assert_eq!(traversal.stop, StopReason::NoNextLink);
        assert_eq!(
            mock.calls()[1],
            "https://scholar.google.com/scholar?start=10&q=x"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_earlier_pages() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_page(results_page(&[("p0", "Cited by 3")], Some("/scholar?start=10")))
            .push_failure("boom")
            .push_failure("boom")
            .push_failure("boom");

        let traversal = driver(&mock, 5, 3).traverse("x").await;

        assert_eq!(mock.call_count(), 4);
        assert_eq!(titles(&traversal.records), vec!["p0"]);
        assert_eq!(traversal.stop, StopReason::FetchFailed { page: 1 });
        assert_eq!(traversal.pages_fetched, 1);
        assert!(traversal.is_partial());
    }

    #[tokio::test]
    async fn test_failure_on_first_page_yields_nothing() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_failure("down").push_failure("down");

        let records = driver(&mock, 5, 2).collect("x").await;

        assert!(records.is_empty());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_page_without_results_still_follows_next_link() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_page(results_page(&[], Some("/scholar?start=10")))
            .push_page(results_page(&[("late", "")], None));

        let records = driver(&mock, 5, 1).collect("x").await;

        assert_eq!(titles(&records), vec!["late"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_pages_but_not_after_last() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_page(results_page(&[("p0", "")], Some("/scholar?start=10")))
            .push_page(results_page(&[("p1", "")], Some("/scholar?start=20")))
            .push_page(results_page(&[("p2", "")], None));

        let start = tokio::time::Instant::now();
        let traversal = paced_driver(&mock, 10, 3000).traverse("x").await;

        assert_eq!(traversal.pages_fetched, 3);
        assert_eq!(start.elapsed(), Duration::from_millis(2 * 3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_page_limit() {
        let mock = Arc::new(MockRenderer::new());
        for _ in 0..3 {
            mock.push_page(results_page(&[("p", "")], Some("/scholar?start=10")));
        }

        let start = tokio::time::Instant::now();
        let traversal = paced_driver(&mock, 2, 3000).traverse("x").await;

        assert_eq!(traversal.stop, StopReason::PageLimit);
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }
}
