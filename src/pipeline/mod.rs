mod config;
mod preview;
mod runner;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, ItemConfig, ItemParams};
pub use preview::{BlockPreview, PREVIEW_CHARS, SplitPreview, preview_blocks};
pub use runner::{
    AppendSummary, FailureRecord, ItemOutcome, ItemOutput, Operation, Runner,
};
