//! HTTP client wrapper for store API requests.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;

use crate::error::{Result, VfsError};

/// Raw response: status code and body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for making requests to the store API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VfsError::Config(format!("Failed to build client: {}", e)))?;
        Ok(Self { client })
    }

    /// Create a new HTTP client routed through a proxy.
    pub fn with_proxy(proxy: &str, timeout: Duration) -> Result<Self> {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| VfsError::Config(format!("Invalid proxy: {}", e)))?;

        let client = Client::builder()
            .proxy(proxy)
            .timeout(timeout)
            .build()
            .map_err(|e| VfsError::Config(format!("Failed to build client: {}", e)))?;

        Ok(Self { client })
    }

    /// Start a request.
    pub fn request(&self, method: Method, url: reqwest::Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request and collect the body.
    ///
    /// Non-2xx statuses are returned, not raised; callers classify them.
    pub async fn send(&self, builder: RequestBuilder) -> Result<HttpResponse> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(%method, %path, status, bytes = body.len(), "store api response");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new(TIMEOUT).is_ok());
    }

    #[test]
    fn test_proxy_creation() {
        let client = HttpClient::with_proxy("http://127.0.0.1:8080", TIMEOUT);
        assert!(client.is_ok());
    }

    #[test]
    fn test_proxy_invalid() {
        let res = HttpClient::with_proxy(":::::::", TIMEOUT);
        assert!(matches!(res, Err(VfsError::Config(_))));
    }

    #[test]
    fn test_response_success() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let missing = HttpResponse {
            status: 404,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!missing.is_success());
    }
}
