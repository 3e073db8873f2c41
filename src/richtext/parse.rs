use super::{RichTextSegment, SegmentError};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RichTextError {
    #[error("Invalid rich text JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid rich text JSON format: expected an array of segments")]
    NotAnArray,

    #[error("Invalid rich text segment at index {index}: {source}")]
    Segment {
        index: usize,
        #[source]
        source: SegmentError,
    },
}

/// Read a rich text array given either as a JSON string or as an
/// already-parsed JSON array
pub fn parse_rich_text(input: &Value) -> Result<Vec<RichTextSegment>, RichTextError> {
    match input {
        Value::String(raw) => {
            let parsed: Value = serde_json::from_str(raw)?;
            segments_from_array(parsed)
        }
        Value::Array(_) => segments_from_array(input.clone()),
        _ => Err(RichTextError::NotAnArray),
    }
}

fn segments_from_array(value: Value) -> Result<Vec<RichTextSegment>, RichTextError> {
    let Value::Array(items) = value else {
        return Err(RichTextError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            RichTextSegment::try_from(item).map_err(|source| RichTextError::Segment { index, source })
        })
        .collect()
}
