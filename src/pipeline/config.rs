use crate::chunker::{BlockType, DEFAULT_MAX_CHARS, NOTION_MAX_CHARS, UnknownBlockType};
use crate::dispatch::{DEFAULT_BATCH_SIZE, DispatchOptions, NOTION_MAX_BATCH};
use crate::ids::{IdError, IdSanitizer};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: i64 },

    #[error("pageId is required to append blocks")]
    MissingPageId,

    #[error("invalid {field}: {source}")]
    InvalidId {
        field: &'static str,
        #[source]
        source: IdError,
    },

    #[error(transparent)]
    BlockType(#[from] UnknownBlockType),
}

/// Parameters of one input item, as the host hands them over.
/// Absent fields fall back to the run-wide defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemParams {
    #[serde(default)]
    pub page_id: Option<String>,
    /// A JSON string or an already-parsed array
    #[serde(default)]
    pub rich_text: Option<Value>,
    #[serde(default)]
    pub max_chars: Option<i64>,
    #[serde(default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub batch_size: Option<i64>,
    #[serde(default)]
    pub after: Option<String>,
    /// Zero or negative means no pause
    #[serde(default)]
    pub delay_ms: Option<i64>,
}

impl ItemParams {
    /// Fill every field this item leaves unset from `defaults`
    pub fn or_defaults(&self, defaults: &ItemParams) -> ItemParams {
        ItemParams {
            page_id: self.page_id.clone().or_else(|| defaults.page_id.clone()),
            rich_text: self.rich_text.clone().or_else(|| defaults.rich_text.clone()),
            max_chars: self.max_chars.or(defaults.max_chars),
            block_type: self
                .block_type
                .clone()
                .or_else(|| defaults.block_type.clone()),
            batch_size: self.batch_size.or(defaults.batch_size),
            after: self.after.clone().or_else(|| defaults.after.clone()),
            delay_ms: self.delay_ms.or(defaults.delay_ms),
        }
    }
}

/// Validated settings for one item, built once and passed through the
/// pack / batch / dispatch stages
#[derive(Debug, Clone, PartialEq)]
pub struct ItemConfig {
    pub page_id: Option<String>,
    pub max_chars: usize,
    pub block_type: BlockType,
    pub batch_size: usize,
    pub dispatch: DispatchOptions,
}

impl ItemConfig {
    /// Defaults: 1900 chars per block, paragraphs, 100 blocks per request
    pub fn new() -> Self {
        Self {
            page_id: None,
            max_chars: DEFAULT_MAX_CHARS,
            block_type: BlockType::Paragraph,
            batch_size: DEFAULT_BATCH_SIZE,
            dispatch: DispatchOptions::default(),
        }
    }

    pub fn page_id(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }

    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn block_type(mut self, block_type: BlockType) -> Self {
        self.block_type = block_type;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn after(mut self, after: impl Into<String>) -> Self {
        self.dispatch.after = Some(after.into());
        self
    }

    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.dispatch.delay_ms = Some(delay_ms);
        self
    }

    /// Validate an item's parameters. `require_page_id` is set when the
    /// blocks will be appended rather than only previewed. A preview never
    /// reads `pageId` or `after`, so they are kept as given without being
    /// checked.
    pub fn from_params(params: &ItemParams, require_page_id: bool) -> Result<Self, ConfigError> {
        let mut config = ItemConfig::new();

        if let Some(max_chars) = params.max_chars {
            config.max_chars = positive("maxChars", max_chars)?;
            if config.max_chars > NOTION_MAX_CHARS {
                warn!(
                    max_chars = config.max_chars,
                    "maxChars is above Notion's {NOTION_MAX_CHARS} character block limit"
                );
            }
        }

        if let Some(block_type) = &params.block_type {
            config.block_type = block_type.parse()?;
        }

        if let Some(batch_size) = params.batch_size {
            config.batch_size = positive("batchSize", batch_size)?;
            if config.batch_size > NOTION_MAX_BATCH {
                warn!(
                    batch_size = config.batch_size,
                    "batchSize is above Notion's {NOTION_MAX_BATCH} blocks per request"
                );
            }
        }

        config.page_id = match params.page_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() && require_page_id => Some(sanitize_id("pageId", raw)?),
            Some(raw) if !raw.is_empty() => Some(raw.to_string()),
            _ if require_page_id => return Err(ConfigError::MissingPageId),
            _ => None,
        };

        // An empty anchor means "append at the end"
        config.dispatch.after = match params.after.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() && require_page_id => Some(sanitize_id("after", raw)?),
            Some(raw) if !raw.is_empty() => Some(raw.to_string()),
            _ => None,
        };
        config.dispatch.delay_ms = params
            .delay_ms
            .and_then(|ms| u64::try_from(ms).ok())
            .filter(|ms| *ms > 0);

        Ok(config)
    }
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn positive(field: &'static str, value: i64) -> Result<usize, ConfigError> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or(ConfigError::NotPositive { field, value })
}

fn sanitize_id(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    IdSanitizer::sanitize(raw).map_err(|source| ConfigError::InvalidId { field, source })
}
