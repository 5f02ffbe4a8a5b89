//! Multi-query runs.

use std::sync::Arc;
use tracing::{info, warn};

use super::{PageFetcher, PaginationDriver, RecordExtractor};
use crate::config::{Config, ConfigError};
use crate::models::{RunResult, Traversal};
use crate::render::Renderer;

/// Runs every query through a [`PaginationDriver`] and merges the records
#[derive(Debug, Clone)]
pub struct QueryOrchestrator {
    driver: PaginationDriver,
}

impl QueryOrchestrator {
    pub fn new(driver: PaginationDriver) -> Self {
        Self { driver }
    }

    /// Wire fetcher, extractor and driver from configuration
    pub fn from_config(config: &Config, renderer: Arc<dyn Renderer>) -> Result<Self, ConfigError> {
        let extractor = RecordExtractor::new(&config.selectors, &config.crawl.base_url)?;
        let fetcher = PageFetcher::new(renderer, config.crawl.retry_policy());
        Ok(Self::new(PaginationDriver::new(
            fetcher,
            extractor,
            &config.crawl,
        )))
    }

    /// Process `queries` in order. A failing query contributes whatever it
    /// collected before the failure; the run itself never fails.
    pub async fn run<S: AsRef<str>>(&self, queries: &[S]) -> RunResult {
        self.run_with(queries, |_, _, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_query(index, query, traversal)`
    /// after each query finishes
    pub async fn run_with<S, F>(&self, queries: &[S], mut on_query: F) -> RunResult
    where
        S: AsRef<str>,
        F: FnMut(usize, &str, &Traversal),
    {
        let mut result = RunResult::new();

        for (index, query) in queries.iter().enumerate() {
            let query = query.as_ref();
            info!(query, "Processing query {}/{}: {:?}", index + 1, queries.len(), query);

            let traversal = self.driver.traverse(query).await;
            if traversal.is_partial() {
                warn!(
                    query,
                    "Query {:?} stopped early ({}), keeping {} records",
                    query,
                    traversal.stop,
                    traversal.records.len()
                );
            } else {
                info!(
                    query,
                    "Query {:?} done: {} records from {} page(s), {}",
                    query,
                    traversal.records.len(),
                    traversal.pages_fetched,
                    traversal.stop
                );
            }

            on_query(index, query, &traversal);
            result.push(query, traversal.records);
        }

        result
    }
}

/// Split raw input on `delimiter` and trim each entry. Empty entries are kept.
pub fn parse_queries(input: &str, delimiter: &str) -> Vec<String> {
    input
        .split(delimiter)
        .map(|q| q.trim().to_string())
        .collect()
}
