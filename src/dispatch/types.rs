// the Notion append-children contract
use crate::chunker::Block;
use serde::Serialize;

/// Body of `PATCH /v1/blocks/{id}/children`
#[derive(Debug, Serialize)]
pub struct AppendChildrenRequest<'a> {
    pub children: &'a [Block],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<&'a str>,
}
