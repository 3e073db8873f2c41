use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdError {
    #[error("Empty id")]
    Empty,

    #[error("Not a Notion id or page URL: {0}")]
    Invalid(String),
}

pub struct IdSanitizer;

impl IdSanitizer {
    /// Normalize a Notion page or block id to its hyphenated form.
    ///
    /// Accepts:
    /// - Hyphenated ids (`5c6a2821-6bb1-4a7e-b6e1-c50111515c3d`)
    /// - Dashless ids, as they appear in page URLs
    /// - Page URLs whose last path segment ends in the id
    ///   (`https://www.notion.so/team/Roadmap-5c6a28216bb14a7eb6e1c50111515c3d?pvs=4`)
    pub fn sanitize(raw_id: &str) -> Result<String, IdError> {
        let trimmed = raw_id.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty);
        }

        // Drop query string and fragment, then keep the last path segment
        let without_query = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or(trimmed)
            .trim_end_matches('/');
        let segment = without_query
            .rsplit('/')
            .next()
            .unwrap_or(without_query);

        if let Ok(id) = Uuid::try_parse(segment) {
            return Ok(id.hyphenated().to_string());
        }

        // Slugged URLs: "Page-Title-<32 hex chars>"
        let tail = segment
            .len()
            .checked_sub(32)
            .and_then(|start| segment.get(start..))
            .filter(|tail| tail.chars().all(|c| c.is_ascii_hexdigit()));

        tail.and_then(|tail| Uuid::try_parse(tail).ok())
            .map(|id| id.hyphenated().to_string())
            .ok_or_else(|| IdError::Invalid(raw_id.to_string()))
    }
}
