use super::{AppendChildrenRequest, BlockAppender, DispatchError};
use crate::chunker::Block;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Per-run dispatch settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Block to insert after; only applies to the first batch
    pub after: Option<String>,
    /// Pause between consecutive batches
    pub delay_ms: Option<u64>,
}

impl DispatchOptions {
    fn delay(&self) -> Option<Duration> {
        self.delay_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// What a dispatch run has committed so far
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub total_blocks_created: usize,
    pub batches_sent: usize,
    /// Raw Notion responses, one per batch, in send order
    pub results: Vec<Value>,
}

/// A batch write failed. Earlier batches are already in the page and are
/// not rolled back; `committed` says how much landed.
#[derive(Debug, Error)]
#[error(
    "batch {failed_batch} of {total_batches} failed ({} blocks in {} earlier batches were already appended): {source}",
    .committed.total_blocks_created,
    .committed.batches_sent
)]
pub struct DispatchFailure {
    /// 1-based index of the batch that failed
    pub failed_batch: usize,
    pub total_batches: usize,
    pub committed: DispatchReport,
    pub source: DispatchError,
}

/// Send `batches` to `target_id` strictly one after another.
///
/// Each write is awaited before the next starts, so blocks land in the page
/// in batch order. The `after` anchor goes with the first batch only; later
/// batches follow whatever the previous one appended. The configured delay is
/// slept between batches, never after the last. The first failed write ends
/// the run.
pub async fn dispatch<A>(
    appender: &A,
    batches: &[&[Block]],
    target_id: &str,
    options: &DispatchOptions,
) -> Result<DispatchReport, DispatchFailure>
where
    A: BlockAppender + ?Sized,
{
    let total_batches = batches.len();
    let delay = options.delay();
    let mut report = DispatchReport::default();

    for (index, batch) in batches.iter().copied().enumerate() {
        let request = AppendChildrenRequest {
            children: batch,
            after: if index == 0 {
                options.after.as_deref()
            } else {
                None
            },
        };

        debug!(
            target_id,
            batch = index + 1,
            total_batches,
            blocks = batch.len(),
            "appending batch"
        );

        let response = match appender.append_children(target_id, &request).await {
            Ok(response) => response,
            Err(source) => {
                warn!(
                    target_id,
                    batch = index + 1,
                    total_batches,
                    committed_blocks = report.total_blocks_created,
                    error = %source,
                    "batch append failed, earlier batches stay in the page"
                );
                return Err(DispatchFailure {
                    failed_batch: index + 1,
                    total_batches,
                    committed: report,
                    source,
                });
            }
        };

        report.total_blocks_created += batch.len();
        report.batches_sent += 1;
        report.results.push(response);

        if index + 1 < total_batches {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    info!(
        target_id,
        blocks = report.total_blocks_created,
        batches = report.batches_sent,
        "dispatch complete"
    );

    Ok(report)
}
