//! Plain HTTP renderer.
//!
//! Returns the server response as-is, without executing scripts. Works
//! without a browser installation.

use async_trait::async_trait;

use super::{RenderError, Renderer};
use crate::config::RenderConfig;
use crate::utils::HttpClient;

/// Renders pages with a single GET request
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: HttpClient,
}

impl HttpRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self, RenderError> {
        Ok(Self {
            client: HttpClient::with_user_agent(&config.user_agent, config.timeout())?,
        })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    fn name(&self) -> &str {
        "http"
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| RenderError::Network(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| RenderError::Network(format!("Failed to read body of {}: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_renderer_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/scholar?q=rust")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>ok</body></html>")
            .create_async()
            .await;

        let renderer = HttpRenderer::new(&RenderConfig::default()).unwrap();
        let html = renderer
            .render(&format!("{}/scholar?q=rust", server.url()))
            .await
            .unwrap();

        assert!(html.contains("ok"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_renderer_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/scholar")
            .with_status(429)
            .create_async()
            .await;

        let renderer = HttpRenderer::new(&RenderConfig::default()).unwrap();
        let err = renderer
            .render(&format!("{}/scholar", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Status { status: 429, .. }));
    }
}
