use super::{AppendChildrenRequest, BlockAppender};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const NOTION_API_BASE: &str = "https://api.notion.com";

/// API version the block payloads are written against
pub const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Notion returned error status {status}: {body}")]
    ServerError { status: u16, body: String },
}

pub struct NotionClient {
    http: Client,
    base_url: String,
    token: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Result<Self, DispatchError> {
        Self::with_base_url(token, NOTION_API_BASE, Duration::from_secs(60))
    }

    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::from_client(http, token, base_url))
    }

    /// Wrap an already configured HTTP client
    pub fn from_client(
        http: Client,
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub fn children_url(&self, block_id: &str) -> String {
        format!(
            "{}/v1/blocks/{}/children",
            self.base_url.trim_end_matches('/'),
            block_id
        )
    }
}

#[async_trait]
impl BlockAppender for NotionClient {
    async fn append_children(
        &self,
        target_id: &str,
        request: &AppendChildrenRequest<'_>,
    ) -> Result<Value, DispatchError> {
        let response = self
            .http
            .patch(self.children_url(target_id))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DispatchError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
