// Public API exports
pub mod chunker;
pub mod dispatch;
pub mod error;
pub mod ids;
pub mod pipeline;
pub mod richtext;

// Re-export main types for convenience
pub use error::SplitterError;
pub use ids::{IdError, IdSanitizer};

pub use richtext::{RichTextError, RichTextSegment, parse_rich_text};

pub use chunker::{
    Block, BlockType, DEFAULT_MAX_CHARS, NOTION_MAX_CHARS, pack_blocks, split_long_segment,
};

pub use dispatch::{
    Batcher, BlockAppender, DispatchError, DispatchFailure, DispatchOptions, DispatchReport,
    NotionClient, dispatch,
};

pub use pipeline::{ItemConfig, ItemOutcome, ItemOutput, ItemParams, Operation, Runner};
