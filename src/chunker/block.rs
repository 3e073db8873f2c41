use crate::richtext::RichTextSegment;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Notion block types that carry a `rich_text` array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockType {
    #[default]
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
    #[serde(rename = "quote")]
    Quote,
    #[serde(rename = "callout")]
    Callout,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown block type `{0}` (expected paragraph, heading_1, heading_2, heading_3, quote or callout)")]
pub struct UnknownBlockType(pub String);

impl BlockType {
    pub const ALL: [BlockType; 6] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::Quote,
        BlockType::Callout,
    ];

    /// The tag Notion uses for this type, also the key of its payload object
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading_1",
            BlockType::Heading2 => "heading_2",
            BlockType::Heading3 => "heading_3",
            BlockType::Quote => "quote",
            BlockType::Callout => "callout",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownBlockType(s.to_string()))
    }
}

/// One Notion block holding a run of rich text segments
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub block_type: BlockType,
    pub rich_text: Vec<RichTextSegment>,
}

impl Block {
    pub fn new(block_type: BlockType, rich_text: Vec<RichTextSegment>) -> Self {
        Self {
            block_type,
            rich_text,
        }
    }

    /// Concatenated visible text of all segments
    pub fn plain_text(&self) -> String {
        self.rich_text
            .iter()
            .map(RichTextSegment::effective_text)
            .collect()
    }

    /// Summed UTF-16 length of all segments
    pub fn text_len(&self) -> usize {
        self.rich_text.iter().map(RichTextSegment::effective_len).sum()
    }
}

#[derive(Serialize)]
struct RichTextBody<'a> {
    rich_text: &'a [RichTextSegment],
}

// {"object": "block", "type": T, T: {"rich_text": [...]}}
impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("object", "block")?;
        map.serialize_entry("type", self.block_type.as_str())?;
        map.serialize_entry(
            self.block_type.as_str(),
            &RichTextBody {
                rich_text: &self.rich_text,
            },
        )?;
        map.end()
    }
}
