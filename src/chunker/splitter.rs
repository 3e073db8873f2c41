use crate::richtext::{RichTextSegment, TextSegment, text_len};

/// How a split piece ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitBreak {
    /// Cut at a space; the space belongs to neither piece
    Word,
    /// Cut mid-token because the window had no usable space
    Hard,
    /// Last piece of the text
    End,
}

/// A window of the original text, in character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSpan {
    pub start: usize,
    pub end: usize,
    pub break_after: SplitBreak,
}

impl SplitSpan {
    /// Number of characters in the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Compute the windows a text is cut into for a `max_chars` limit, counted
/// in UTF-16 units like [`text_len`](crate::richtext::text_len).
///
/// Each window holds as many whole characters as fit in `max_chars` units,
/// unless a space can shorten it: the nearest space inside the window, or
/// the character right after it (but not at the window start), ends the
/// window and is dropped.
/// Without such a space the window is hard-cut. A cut never falls inside a
/// surrogate pair; a single character wider than the limit becomes its own
/// window. Text that already fits comes back as one `End` span.
pub fn split_spans(text: &str, max_chars: usize) -> Vec<SplitSpan> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if max_chars == 0 || text_len(text) <= max_chars {
        return vec![SplitSpan {
            start: 0,
            end: len,
            break_after: SplitBreak::End,
        }];
    }

    let mut spans = Vec::new();
    let mut start = 0;

    while start < len {
        // First character that no longer fits in the window
        let mut window_end = start;
        let mut units = 0;
        while window_end < len && units + chars[window_end].len_utf16() <= max_chars {
            units += chars[window_end].len_utf16();
            window_end += 1;
        }

        if window_end >= len {
            spans.push(SplitSpan {
                start,
                end: len,
                break_after: SplitBreak::End,
            });
            break;
        }

        let space = (start + 1..=window_end).rev().find(|&i| chars[i] == ' ');
        match space {
            Some(space) => {
                spans.push(SplitSpan {
                    start,
                    end: space,
                    break_after: SplitBreak::Word,
                });
                start = space + 1;
            }
            None => {
                let end = window_end.max(start + 1);
                spans.push(SplitSpan {
                    start,
                    end,
                    break_after: if end >= len {
                        SplitBreak::End
                    } else {
                        SplitBreak::Hard
                    },
                });
                start = end;
            }
        }
    }

    spans
}

/// Split one over-long text segment into pieces of at most `max_chars`
/// UTF-16 units, each a copy of the original with only its content replaced.
pub fn split_long_segment(segment: &TextSegment, max_chars: usize) -> Vec<RichTextSegment> {
    let text = segment.content();

    // Byte offset of every char boundary, including the end of the text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    split_spans(text, max_chars)
        .into_iter()
        .map(|span| segment.with_content(&text[boundaries[span.start]..boundaries[span.end]]))
        .collect()
}

/// Rebuild the original text from split pieces, re-inserting the space that
/// every `Word` break consumed.
pub fn reassemble<'a, I>(pieces: I) -> String
where
    I: IntoIterator<Item = (&'a str, SplitBreak)>,
{
    let mut text = String::new();
    for (piece, break_after) in pieces {
        text.push_str(piece);
        if break_after == SplitBreak::Word {
            text.push(' ');
        }
    }
    text
}
