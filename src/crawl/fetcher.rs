//! Page fetching with bounded retries.

use std::sync::Arc;

use crate::render::{RenderError, Renderer};
use crate::utils::{with_retry, RetryPolicy};

/// A page could not be fetched within the attempt budget
#[derive(Debug, thiserror::Error)]
#[error("failed to fetch {url} after {attempts} attempt(s): {source}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    #[source]
    pub source: RenderError,
}

/// Fetches pages through a [`Renderer`], retrying failed attempts
#[derive(Debug, Clone)]
pub struct PageFetcher {
    renderer: Arc<dyn Renderer>,
    policy: RetryPolicy,
}

impl PageFetcher {
    pub fn new(renderer: Arc<dyn Renderer>, policy: RetryPolicy) -> Self {
        Self { renderer, policy }
    }

    /// Render `url`, retrying every failure up to the policy's attempt limit
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let label = format!("fetch {} via {}", url, self.renderer.name());

        with_retry(self.policy, &label, |_attempt| self.renderer.render(url))
            .await
            .map_err(|e| FetchError {
                url: url.to_string(),
                attempts: e.attempts,
                source: e.source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MockRenderer;
    use crate::test_support::{capture_levels, LevelCounts};
    use std::time::Duration;

    fn fetcher(mock: &Arc<MockRenderer>, attempts: u32) -> PageFetcher {
        PageFetcher::new(
            mock.clone(),
            RetryPolicy::fixed(attempts, Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_page("<html>page</html>").push_page("unused");

        let html = fetcher(&mock, 3).fetch("https://x/1").await.unwrap();

        assert_eq!(html, "<html>page</html>");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.remaining(), 1);
    }

    #[tokio::test]
    async fn test_recovers_on_third_attempt_with_two_warnings() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_failure("navigation timeout")
            .push_failure("net::ERR_CONNECTION_RESET")
            .push_page("<html>third time</html>");

        let fetcher = fetcher(&mock, 3);
        let (result, counts) = capture_levels(fetcher.fetch("https://x/1")).await;

        assert_eq!(result.unwrap(), "<html>third time</html>");
        assert_eq!(mock.call_count(), 3);
        assert_eq!(
            counts,
            LevelCounts {
                warn: 2,
                error: 0,
                ..counts
            }
        );
    }

    #[tokio::test]
    async fn test_exhaustion_returns_fetch_error() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_failure("a").push_failure("b");

        let fetcher = fetcher(&mock, 2);
        let (result, counts) = capture_levels(fetcher.fetch("https://x/1")).await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 2);
        assert_eq!(err.url, "https://x/1");
        assert!(err.source.to_string().contains('b'));
        assert_eq!(mock.call_count(), 2);
        assert_eq!(counts.warn, 1);
        assert_eq!(counts.error, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_after_successful_attempt() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_page("<html>ok</html>");
        let fetcher = PageFetcher::new(
            mock.clone(),
            RetryPolicy::fixed(3, Duration::from_secs(2)),
        );

        let start = tokio::time::Instant::now();
        fetcher.fetch("https://x/1").await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_attempts() {
        let mock = Arc::new(MockRenderer::new());
        mock.push_failure("timeout").push_page("<html>ok</html>");
        let fetcher = PageFetcher::new(
            mock.clone(),
            RetryPolicy::fixed(3, Duration::from_secs(2)),
        );

        let start = tokio::time::Instant::now();
        fetcher.fetch("https://x/1").await.unwrap();

        assert_eq!(mock.call_count(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
