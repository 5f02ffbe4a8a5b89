//! Core data models for scraped records and crawl results.

mod record;
mod run;

pub use record::{Record, RecordBuilder};
pub use run::{RunResult, StopReason, Traversal};
