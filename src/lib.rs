//! # Scholar Crawler
//!
//! Crawls Google Scholar result pages for a list of queries and exports the
//! extracted records as JSON, CSV, XLSX or PDF.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Record, Traversal, RunResult)
//! - [`render`]: Page rendering backends behind the [`Renderer`] trait
//! - [`crawl`]: Fetching with retries, record extraction, pagination and multi-query runs
//! - [`export`]: Output writers
//! - [`config`]: Configuration management
//! - [`utils`]: Retry policy and HTTP client
//! - [`ui`]: Terminal output for the CLI
//!
//! ## Example
//!
//! ```no_run
//! use scholar_crawler::config::Config;
//! use scholar_crawler::crawl::QueryOrchestrator;
//! use scholar_crawler::export::{export, OutputFormat};
//! use scholar_crawler::render::build_renderer;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let renderer = build_renderer(&config.render)?;
//! let orchestrator = QueryOrchestrator::from_config(&config, renderer)?;
//!
//! let result = orchestrator.run(&["graph neural networks"]).await;
//! export(&result, OutputFormat::Json, &config.output.directory, "articles")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crawl;
pub mod export;
pub mod models;
pub mod render;
pub mod ui;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use crawl::{PaginationDriver, QueryOrchestrator};
pub use models::{Record, RunResult};
pub use render::Renderer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
