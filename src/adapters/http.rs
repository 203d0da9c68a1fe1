use crate::domain::model::{RawPayload, SourceKind};
use crate::domain::ports::{DataSource, FetchResult};
use crate::utils::error::{FetchError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 透過 HTTP 取得原始資料
#[derive(Debug, Clone)]
pub struct HttpSource {
    name: String,
    endpoint: String,
    method: Method,
    headers: HashMap<String, String>,
    timeout: Duration,
    client: Client,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_options(endpoint, Method::GET, HashMap::new(), DEFAULT_TIMEOUT)
    }

    pub fn with_options(
        endpoint: impl Into<String>,
        method: Method,
        headers: HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            name: "network".to_string(),
            endpoint: endpoint.into(),
            method,
            headers,
            timeout,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn transport_error(&self, err: reqwest::Error) -> FetchError {
        FetchError::from_transport(&self.name, self.timeout, err)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Network
    }

    async fn fetch(&self) -> FetchResult {
        tracing::debug!("Making {} request to: {}", self.method, self.endpoint);

        let mut request = self.client.request(self.method.clone(), &self.endpoint);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Status {
                source_name: self.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok(RawPayload::new(body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/posts/1")
                .header("Authorization", "Bearer token");
            then.status(200).body(r#"{"title":"First Post"}"#);
        });

        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer token".to_string());
        let source = HttpSource::with_options(
            server.url("/posts/1"),
            Method::GET,
            headers,
            Duration::from_secs(5),
        )
        .unwrap();

        let payload = source.fetch().await.unwrap();

        api_mock.assert();
        assert_eq!(payload.as_bytes(), br#"{"title":"First Post"}"#);
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let source = HttpSource::new(server.url("/missing")).unwrap();
        let err = source.fetch().await.unwrap_err();

        assert_eq!(
            err,
            FetchError::Status {
                source_name: "network".to_string(),
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        // port 0 無法連線
        let source = HttpSource::new("http://127.0.0.1:0/data").unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Unreachable { .. }));
    }
}
