use crate::core::{ConfigProvider, RawResponse, SourceClient};
use crate::utils::error::{FetchFailure, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Several upstream sites reject reqwest's default identifier.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpSourceClient {
    client: Client,
}

impl HttpSourceClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.user_agent())
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> std::result::Result<RawResponse, FetchFailure> {
        tracing::debug!("GET {} (timeout {:?})", url, timeout);

        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        tracing::debug!("Response status from {}: {}", url, status);

        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(RawResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
