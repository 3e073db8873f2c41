use super::config::{ConfigError, ItemConfig, ItemParams};
use super::preview::{SplitPreview, preview_blocks};
use crate::chunker::pack_blocks;
use crate::dispatch::{Batcher, BlockAppender, DispatchReport, dispatch};
use crate::error::SplitterError;
use crate::richtext::parse_rich_text;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// What to do with each item's blocks
#[derive(Clone, Copy)]
pub enum Operation<'a> {
    /// Append the blocks to the item's page through `appender`
    AppendRichText(&'a dyn BlockAppender),
    /// Only pack the blocks and report a preview
    SplitOnly,
}

impl Operation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AppendRichText(_) => "appendRichText",
            Operation::SplitOnly => "splitOnly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendSummary {
    pub success: bool,
    pub page_id: String,
    pub total_blocks_created: usize,
    pub batches_sent: usize,
    pub results: Vec<Value>,
}

impl AppendSummary {
    fn new(page_id: &str, report: DispatchReport) -> Self {
        Self {
            success: true,
            page_id: page_id.to_string(),
            total_blocks_created: report.total_blocks_created,
            batches_sent: report.batches_sent,
            results: report.results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemOutcome {
    Appended(AppendSummary),
    Preview(SplitPreview),
    Failed(FailureRecord),
}

/// Result for one input item, paired with the item's position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutput {
    pub item: usize,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Runs items one after another: parse, pack, then append or preview.
pub struct Runner<'a> {
    operation: Operation<'a>,
    continue_on_fail: bool,
}

impl<'a> Runner<'a> {
    pub fn new(operation: Operation<'a>) -> Self {
        Self {
            operation,
            continue_on_fail: false,
        }
    }

    /// Record failed items and keep going instead of stopping the run
    pub fn continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }

    /// Process every item in order. Without `continue_on_fail` the first
    /// failing item ends the run with its error.
    pub async fn run(&self, items: &[ItemParams]) -> Result<Vec<ItemOutput>, SplitterError> {
        let mut outputs = Vec::with_capacity(items.len());

        for (item, params) in items.iter().enumerate() {
            let outcome = match self.process(item, params).await {
                Ok(outcome) => outcome,
                Err(err) if self.continue_on_fail => {
                    warn!(item, error = %err, "item failed, continuing with the next one");
                    ItemOutcome::Failed(FailureRecord {
                        error: err.to_string(),
                    })
                }
                Err(err) => return Err(err),
            };
            outputs.push(ItemOutput { item, outcome });
        }

        Ok(outputs)
    }

    async fn process(&self, item: usize, params: &ItemParams) -> Result<ItemOutcome, SplitterError> {
        let require_page_id = matches!(self.operation, Operation::AppendRichText(_));
        let config = ItemConfig::from_params(params, require_page_id)
            .map_err(|source| SplitterError::InvalidConfig { item, source })?;

        let segments = match &params.rich_text {
            Some(rich_text) => parse_rich_text(rich_text)
                .map_err(|source| SplitterError::MalformedInput { item, source })?,
            None => Vec::new(),
        };

        let segment_count = segments.len();
        let blocks = pack_blocks(segments, config.max_chars, config.block_type);
        info!(
            item,
            operation = self.operation.name(),
            segments = segment_count,
            blocks = blocks.len(),
            max_chars = config.max_chars,
            "packed rich text"
        );

        match self.operation {
            Operation::SplitOnly => Ok(ItemOutcome::Preview(preview_blocks(blocks))),
            Operation::AppendRichText(appender) => {
                let Some(page_id) = config.page_id.as_deref() else {
                    return Err(SplitterError::InvalidConfig {
                        item,
                        source: ConfigError::MissingPageId,
                    });
                };

                let batches = Batcher::new(config.batch_size).split(&blocks);
                let report = dispatch(appender, &batches, page_id, &config.dispatch)
                    .await
                    .map_err(|source| SplitterError::RemoteWrite { item, source })?;

                Ok(ItemOutcome::Appended(AppendSummary::new(page_id, report)))
            }
        }
    }
}
