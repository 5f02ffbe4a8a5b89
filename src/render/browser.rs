//! Headless Chrome renderer.
//!
//! Each call launches its own browser, renders one page, and drops the
//! browser again, which terminates the Chrome process even when navigation
//! failed halfway. The driver is blocking, so the work runs on tokio's
//! blocking pool.

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::path::PathBuf;
use std::time::Duration;

use super::{RenderError, Renderer};
use crate::config::RenderConfig;

/// Renders pages with a fresh headless Chrome instance per call
#[derive(Debug, Clone)]
pub struct BrowserRenderer {
    executable_path: Option<PathBuf>,
    headless: bool,
    user_agent: String,
    timeout: Duration,
}

impl BrowserRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            executable_path: config.executable_path.clone(),
            headless: config.headless,
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
        }
    }

    fn launch_options(&self) -> Result<LaunchOptions<'static>, RenderError> {
        LaunchOptions::default_builder()
            .headless(self.headless)
            .path(self.executable_path.clone())
            .idle_browser_timeout(self.timeout.max(Duration::from_secs(30)))
            .build()
            .map_err(|e| RenderError::Browser(format!("invalid launch options: {}", e)))
    }

    fn render_blocking(&self, url: &str) -> Result<String, RenderError> {
        let browser = Browser::new(self.launch_options()?).map_err(browser_error)?;
        let tab = browser.new_tab().map_err(browser_error)?;
        tab.set_default_timeout(self.timeout);
        tab.set_user_agent(&self.user_agent, Some("en-US,en;q=0.9"), None)
            .map_err(browser_error)?;

        tab.navigate_to(url).map_err(browser_error)?;
        tab.wait_until_navigated().map_err(browser_error)?;
        let content = tab.get_content().map_err(browser_error)?;

        if let Err(e) = tab.close(true) {
            tracing::debug!("Failed to close tab for {}: {}", url, e);
        }
        Ok(content)
    }
}

fn browser_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Browser(err.to_string())
}

#[async_trait]
impl Renderer for BrowserRenderer {
    fn name(&self) -> &str {
        "browser"
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let this = self.clone();
        let url = url.to_string();

        tokio::task::spawn_blocking(move || this.render_blocking(&url))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_takes_executable_from_config() {
        let config = RenderConfig {
            executable_path: Some(PathBuf::from("/opt/chrome/chrome")),
            ..Default::default()
        };
        let renderer = BrowserRenderer::new(&config);
        assert_eq!(
            renderer.executable_path.as_deref(),
            Some(std::path::Path::new("/opt/chrome/chrome"))
        );
        assert!(renderer.headless);
    }

    #[test]
    fn test_launch_options_build() {
        let renderer = BrowserRenderer::new(&RenderConfig::default());
        assert!(renderer.launch_options().is_ok());
    }
}
