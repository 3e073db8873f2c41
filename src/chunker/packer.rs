use super::block::{Block, BlockType};
use super::splitter::split_long_segment;
use crate::richtext::RichTextSegment;
use tracing::debug;

/// Pack rich text segments into blocks according to the rules:
/// - Keep segments in order and untouched
/// - Merge consecutive segments while their summed length fits `max_chars`
/// - Split a text segment that alone exceeds `max_chars`, one block per piece
/// - Emit an oversized non-text segment alone, since it cannot be split
pub fn pack_blocks(
    segments: Vec<RichTextSegment>,
    max_chars: usize,
    block_type: BlockType,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current_run: Vec<RichTextSegment> = Vec::new();
    let mut current_len = 0;

    for segment in segments {
        let segment_len = segment.effective_len();

        // If this segment alone exceeds max_chars, split it separately
        if segment_len > max_chars {
            if !current_run.is_empty() {
                blocks.push(Block::new(block_type, std::mem::take(&mut current_run)));
                current_len = 0;
            }

            let pieces = match segment {
                RichTextSegment::Text(text) => split_long_segment(&text, max_chars),
                unsplittable => {
                    debug!(
                        len = segment_len,
                        max_chars, "non-text segment exceeds the block limit, kept whole"
                    );
                    vec![unsplittable]
                }
            };
            blocks.extend(
                pieces
                    .into_iter()
                    .map(|piece| Block::new(block_type, vec![piece])),
            );
            continue;
        }

        if current_len + segment_len > max_chars && !current_run.is_empty() {
            blocks.push(Block::new(block_type, std::mem::take(&mut current_run)));
            current_len = 0;
        }

        current_len += segment_len;
        current_run.push(segment);
    }

    if !current_run.is_empty() {
        blocks.push(Block::new(block_type, current_run));
    }

    blocks
}
