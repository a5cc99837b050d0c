use crate::utils::error::{FetchFailure, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Successful upstream response (HTTP 200).
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Performs one GET. Transport problems come back as `FetchFailure`, never a panic.
    async fn fetch(&self, url: &str, timeout: Duration) -> std::result::Result<RawResponse, FetchFailure>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_dir(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn user_agent(&self) -> &str;
}
