use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    #[error("rich text segment must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("text segment has no `text.content` string")]
    MissingContent,
}

/// Length of `text` in UTF-16 code units, the unit of Notion's block limit.
/// Characters outside the BMP (most emoji) count twice.
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// One entry of a Notion `rich_text` array
///
/// Every variant keeps the full JSON object it was read from, so annotations,
/// links and mention payloads round-trip untouched. Only a text segment's
/// `text.content` can change, and only through [`TextSegment::with_content`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum RichTextSegment {
    /// `"type": "text"`, the only kind that can be split
    Text(TextSegment),
    /// `"type": "mention"` (pages, users, dates, ...)
    Mention(ReferenceSegment),
    /// `"type": "equation"`
    Equation(ReferenceSegment),
    /// Any other type tag; measured by its plain text
    Other(ReferenceSegment),
}

/// A text-bearing segment
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    content: String,
    raw: Map<String, Value>,
}

/// A segment whose visible text is only described by `plain_text`
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSegment {
    plain_text: String,
    raw: Map<String, Value>,
}

impl RichTextSegment {
    /// Build a plain, unannotated text segment
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut text = Map::new();
        text.insert("content".into(), Value::String(content.clone()));

        let mut raw = Map::new();
        raw.insert("type".into(), Value::String("text".into()));
        raw.insert("text".into(), Value::Object(text));

        RichTextSegment::Text(TextSegment { content, raw })
    }

    /// The text this segment shows in the page
    pub fn effective_text(&self) -> &str {
        match self {
            RichTextSegment::Text(seg) => &seg.content,
            RichTextSegment::Mention(seg)
            | RichTextSegment::Equation(seg)
            | RichTextSegment::Other(seg) => &seg.plain_text,
        }
    }

    /// Length of [`effective_text`](Self::effective_text) as Notion counts
    /// it, see [`text_len`]
    pub fn effective_len(&self) -> usize {
        text_len(self.effective_text())
    }

    pub fn as_text(&self) -> Option<&TextSegment> {
        match self {
            RichTextSegment::Text(seg) => Some(seg),
            _ => None,
        }
    }

    /// The original JSON object
    pub fn raw(&self) -> &Map<String, Value> {
        match self {
            RichTextSegment::Text(seg) => &seg.raw,
            RichTextSegment::Mention(seg)
            | RichTextSegment::Equation(seg)
            | RichTextSegment::Other(seg) => &seg.raw,
        }
    }
}

impl TextSegment {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Copy of this segment with every field kept except `text.content`
    pub fn with_content(&self, content: impl Into<String>) -> RichTextSegment {
        RichTextSegment::Text(TextSegment {
            content: content.into(),
            raw: self.raw.clone(),
        })
    }

    fn from_raw(raw: Map<String, Value>) -> Result<Self, SegmentError> {
        let content = raw
            .get("text")
            .and_then(|text| text.get("content"))
            .and_then(Value::as_str)
            .ok_or(SegmentError::MissingContent)?
            .to_string();

        Ok(Self { content, raw })
    }
}

impl ReferenceSegment {
    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    fn from_raw(raw: Map<String, Value>, kind: &str) -> Self {
        // Older payloads put plain_text inside the typed object
        let plain_text = raw
            .get("plain_text")
            .or_else(|| raw.get(kind).and_then(|inner| inner.get("plain_text")))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Self { plain_text, raw }
    }
}

impl TryFrom<Value> for RichTextSegment {
    type Error = SegmentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let raw = match value {
            Value::Object(raw) => raw,
            other => return Err(SegmentError::NotAnObject(json_kind(&other))),
        };

        let tag = raw.get("type").and_then(Value::as_str).map(str::to_owned);
        match tag.as_deref() {
            Some("text") => TextSegment::from_raw(raw).map(RichTextSegment::Text),
            None if raw.contains_key("text") => {
                TextSegment::from_raw(raw).map(RichTextSegment::Text)
            }
            Some("mention") => Ok(RichTextSegment::Mention(ReferenceSegment::from_raw(
                raw, "mention",
            ))),
            Some("equation") => Ok(RichTextSegment::Equation(ReferenceSegment::from_raw(
                raw, "equation",
            ))),
            Some(other) => Ok(RichTextSegment::Other(ReferenceSegment::from_raw(raw, other))),
            None => Ok(RichTextSegment::Other(ReferenceSegment::from_raw(raw, ""))),
        }
    }
}

impl From<RichTextSegment> for Value {
    fn from(segment: RichTextSegment) -> Self {
        match segment {
            RichTextSegment::Text(TextSegment { content, mut raw }) => {
                match raw.get_mut("text") {
                    Some(Value::Object(text)) => {
                        text.insert("content".into(), Value::String(content));
                    }
                    _ => {
                        let mut text = Map::new();
                        text.insert("content".into(), Value::String(content));
                        raw.insert("text".into(), Value::Object(text));
                    }
                }
                Value::Object(raw)
            }
            RichTextSegment::Mention(seg)
            | RichTextSegment::Equation(seg)
            | RichTextSegment::Other(seg) => Value::Object(seg.raw),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
