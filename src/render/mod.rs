//! Page rendering backends.
//!
//! A [`Renderer`] turns a URL into the final HTML of the page. Every call
//! owns whatever resource it needs (browser process, connection) and
//! releases it before returning, so nothing is shared between attempts.
//!
//! - [`BrowserRenderer`]: headless Chrome (cargo feature `browser`, on by default)
//! - [`HttpRenderer`]: plain HTTP GET
//! - [`MockRenderer`]: scripted responses for tests

#[cfg(feature = "browser")]
mod browser;
mod http;
pub mod mock;

#[cfg(feature = "browser")]
pub use browser::BrowserRenderer;
pub use http::HttpRenderer;
pub use mock::MockRenderer;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{RenderConfig, RenderEngine};

/// Retrieves the rendered HTML of a page
#[async_trait]
pub trait Renderer: Send + Sync + std::fmt::Debug {
    /// Short identifier used in log messages
    fn name(&self) -> &str;

    /// Render `url` and return its final HTML
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Errors that can occur while rendering a page
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Browser launch or navigation failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The background render task panicked or was cancelled
    #[error("Render task failed: {0}")]
    Task(String),

    /// The requested engine is not compiled in
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for RenderError {
    fn from(err: reqwest::Error) -> Self {
        RenderError::Network(err.to_string())
    }
}

/// Build the renderer selected by the configuration
pub fn build_renderer(config: &RenderConfig) -> Result<Arc<dyn Renderer>, RenderError> {
    match config.engine {
        #[cfg(feature = "browser")]
        RenderEngine::Browser => Ok(Arc::new(BrowserRenderer::new(config))),
        #[cfg(not(feature = "browser"))]
        RenderEngine::Browser => Err(RenderError::Unavailable(
            "built without the `browser` feature; set render.engine = \"http\"".to_string(),
        )),
        RenderEngine::Http => Ok(Arc::new(HttpRenderer::new(config)?)),
    }
}
