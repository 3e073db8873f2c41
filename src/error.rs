use crate::dispatch::DispatchFailure;
use crate::pipeline::ConfigError;
use crate::richtext::RichTextError;
use thiserror::Error;

/// Failure of one input item. `item` is the item's position in the run.
#[derive(Error, Debug)]
pub enum SplitterError {
    #[error("{source}")]
    MalformedInput {
        item: usize,
        #[source]
        source: RichTextError,
    },

    #[error("Invalid configuration: {source}")]
    InvalidConfig {
        item: usize,
        #[source]
        source: ConfigError,
    },

    #[error("Failed to append blocks: {source}")]
    RemoteWrite {
        item: usize,
        #[source]
        source: DispatchFailure,
    },
}

impl SplitterError {
    pub fn item(&self) -> usize {
        match self {
            SplitterError::MalformedInput { item, .. }
            | SplitterError::InvalidConfig { item, .. }
            | SplitterError::RemoteWrite { item, .. } => *item,
        }
    }
}
