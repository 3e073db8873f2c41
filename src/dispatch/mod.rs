pub mod batcher;
pub mod client;
pub mod dispatcher;
pub mod types;


pub use batcher::{Batcher, DEFAULT_BATCH_SIZE, NOTION_MAX_BATCH};
pub use client::{DispatchError, NOTION_API_BASE, NOTION_VERSION, NotionClient};
pub use dispatcher::{DispatchFailure, DispatchOptions, DispatchReport, dispatch};
pub use types::AppendChildrenRequest;

use async_trait::async_trait;
use serde_json::Value;

/// Remote side of the dispatch loop: appends one batch of blocks under a
/// page or block and returns the raw response
#[async_trait]
pub trait BlockAppender: Send + Sync {
    async fn append_children(
        &self,
        target_id: &str,
        request: &AppendChildrenRequest<'_>,
    ) -> Result<Value, DispatchError>;
}
