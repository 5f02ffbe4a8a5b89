//! Mock renderer for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use super::{RenderError, Renderer};

/// A renderer that replays scripted responses in call order and records
/// every requested URL.
///
/// Once the script is exhausted every further call fails.
#[derive(Debug, Default)]
pub struct MockRenderer {
    script: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<String>>,
}

impl MockRenderer {
    /// Create a new mock renderer with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful render returning `html`.
    pub fn push_page(&self, html: impl Into<String>) -> &Self {
        self.script_mut().push_back(Ok(html.into()));
        self
    }

    /// Queue a failed render.
    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        self.script_mut().push_back(Err(message.into()));
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of render calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script_mut().len()
    }

    fn script_mut(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        let next = self.script_mut().pop_front();
        match next {
            Some(Ok(html)) => Ok(html),
            Some(Err(message)) => Err(RenderError::Other(message)),
            None => Err(RenderError::Other(format!("no scripted response for {}", url))),
        }
    }
}

/// Minimal results page with one result block per `(title, footer)` pair and
/// an optional next-page href.
pub fn results_page(results: &[(&str, &str)], next_href: Option<&str>) -> String {
    let blocks: String = results
        .iter()
        .map(|(title, footer)| {
            format!(
                r#"<div class="gs_r gs_or gs_scl">
  <h3 class="gs_rt"><a href="https://example.org/{title}">{title}</a></h3>
  <div class="gs_a">Author - Venue, 2020</div>
  <div class="gs_rs">Abstract of {title}</div>
  <div class="gs_fl"><a href="/cites">{footer}</a></div>
</div>"#
            )
        })
        .collect();

    let pager = next_href
        .map(|href| {
            format!(r#"<table><tr><td><a class="gs_nma" href="{href}">Next</a></td></tr></table>"#)
        })
        .unwrap_or_default();

    format!("<html><body>{blocks}{pager}</body></html>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_script_in_order() {
        let mock = MockRenderer::new();
        mock.push_page("one").push_failure("down").push_page("two");

        assert_eq!(mock.render("u1").await.unwrap(), "one");
        assert!(mock.render("u2").await.is_err());
        assert_eq!(mock.render("u3").await.unwrap(), "two");
        assert!(mock.render("u4").await.is_err());

        assert_eq!(mock.calls(), vec!["u1", "u2", "u3", "u4"]);
        assert_eq!(mock.remaining(), 0);
    }
}
