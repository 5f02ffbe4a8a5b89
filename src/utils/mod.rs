//! Utility modules supporting crawl operations.
//!
//! - [`HttpClient`]: shared reqwest client with sensible timeouts
//! - [`RetryPolicy`]: attempt budget and delay between attempts
//! - [`with_retry`]: execute an operation, retrying every failure until the budget is spent
//!
//! # Retry
//!
//! ```rust,no_run
//! use scholar_crawler::utils::{with_retry, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn fetch_data() -> Result<String, std::io::Error> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::fixed(3, Duration::from_millis(500));
//! let data = with_retry(policy, "fetch data", |_attempt| fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::HttpClient;
pub use retry::{with_retry, RetryError, RetryPolicy};
