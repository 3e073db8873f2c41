mod parse;
mod segment;


pub use parse::{RichTextError, parse_rich_text};
pub use segment::{ReferenceSegment, RichTextSegment, SegmentError, TextSegment, text_len};
