use crate::chunker::Block;
use crate::richtext::text_len;
use serde::Serialize;

/// UTF-16 units of block text shown in a preview
pub const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitPreview {
    pub blocks: Vec<Block>,
    pub block_count: usize,
    pub preview: Vec<BlockPreview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockPreview {
    pub length: usize,
    pub preview: String,
}

pub fn preview_blocks(blocks: Vec<Block>) -> SplitPreview {
    let preview = blocks
        .iter()
        .map(|block| {
            let text = block.plain_text();
            BlockPreview {
                length: text_len(&text),
                preview: truncate_preview(&text, PREVIEW_CHARS),
            }
        })
        .collect();

    SplitPreview {
        block_count: blocks.len(),
        blocks,
        preview,
    }
}

/// Leading whole characters that fit in `max_chars` UTF-16 units, with
/// `...` appended when anything was cut
fn truncate_preview(text: &str, max_chars: usize) -> String {
    let mut units = 0;
    for (i, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max_chars {
            return format!("{}...", &text[..i]);
        }
    }
    text.to_string()
}
