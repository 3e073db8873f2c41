mod block;
mod packer;
mod splitter;


pub use block::{Block, BlockType, UnknownBlockType};
pub use packer::pack_blocks;
pub use splitter::{SplitBreak, SplitSpan, reassemble, split_long_segment, split_spans};

/// Hard per-block rich text limit enforced by Notion
pub const NOTION_MAX_CHARS: usize = 2000;

/// Default limit, leaving headroom under [`NOTION_MAX_CHARS`]
pub const DEFAULT_MAX_CHARS: usize = 1900;
