//! `GET <api-base>/llms` → `[{"name": "..."}, ...]`

use async_trait::async_trait;
use multichat_application::{CatalogError, ModelCatalog};
use multichat_domain::ModelDescriptor;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpModelCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpModelCatalog {
    pub fn new(api_url: &str) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::ConnectionError(e.to_string()))?;
        Ok(Self::with_client(client, api_url))
    }

    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/llms", api_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ModelCatalog for HttpModelCatalog {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, CatalogError> {
        debug!("Fetching models from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::RequestFailed {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<ModelDescriptor>>()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP response on a loopback port and return the API base.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    #[test]
    fn test_url_built_from_api_base() {
        let catalog = HttpModelCatalog::new("http://localhost:8000/api/").unwrap();
        assert_eq!(catalog.url(), "http://localhost:8000/api/llms");
    }

    #[tokio::test]
    async fn test_list_models() {
        let api = serve_once(
            "HTTP/1.1 200 OK",
            r#"[{"name":"granite-3b"},{"name":"llama-3-8b"}]"#,
        )
        .await;
        let catalog = HttpModelCatalog::new(&api).unwrap();

        let models = catalog.list_models().await.unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "granite-3b");
    }

    #[tokio::test]
    async fn test_error_status() {
        let api = serve_once("HTTP/1.1 503 Service Unavailable", "[]").await;
        let catalog = HttpModelCatalog::new(&api).unwrap();

        let result = catalog.list_models().await;

        assert!(matches!(
            result,
            Err(CatalogError::RequestFailed { status: 503 })
        ));
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let api = serve_once("HTTP/1.1 200 OK", r#"{"models":[]}"#).await;
        let catalog = HttpModelCatalog::new(&api).unwrap();

        assert!(matches!(
            catalog.list_models().await,
            Err(CatalogError::InvalidResponse(_))
        ));
    }
}
