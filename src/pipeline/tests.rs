use super::*;
use crate::chunker::{BlockType, DEFAULT_MAX_CHARS};
use crate::dispatch::{AppendChildrenRequest, BlockAppender, DispatchError};
use crate::error::SplitterError;
use crate::ids::IdError;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;

const PAGE: &str = "5c6a2821-6bb1-4a7e-b6e1-c50111515c3d";
const PAGE_DASHLESS: &str = "5c6a28216bb14a7eb6e1c50111515c3d";
const ANCHOR: &str = "0f1e2d3c-4b5a-4968-8776-a5b4c3d2e1f0";

#[derive(Default)]
struct FakeNotion {
    /// (target id, block count, after) per call
    calls: Mutex<Vec<(String, usize, Option<String>)>>,
    fail_on_call: Option<usize>,
}

impl FakeNotion {
    fn failing_on(call: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: Some(call),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BlockAppender for FakeNotion {
    async fn append_children(
        &self,
        target_id: &str,
        request: &AppendChildrenRequest<'_>,
    ) -> Result<Value, DispatchError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((
                target_id.to_string(),
                request.children.len(),
                request.after.map(str::to_string),
            ));
            calls.len()
        };

        if self.fail_on_call == Some(call) {
            return Err(DispatchError::ServerError {
                status: 400,
                body: "validation_error".to_string(),
            });
        }

        Ok(json!({"object": "list", "results": []}))
    }
}

fn params(rich_text: Value) -> ItemParams {
    ItemParams {
        page_id: Some(PAGE.to_string()),
        rich_text: Some(rich_text),
        ..ItemParams::default()
    }
}

/// `count` segments of exactly `max_chars` characters each
fn full_segments(count: usize, len: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|_| json!({"type": "text", "text": {"content": "z".repeat(len)}}))
            .collect(),
    )
}

#[test]
fn test_config_defaults() {
    let config = ItemConfig::from_params(&ItemParams::default(), false).unwrap();

    assert_eq!(config, ItemConfig::default());
    assert_eq!(config.max_chars, DEFAULT_MAX_CHARS);
    assert_eq!(config.batch_size, 100);
    assert_eq!(config.block_type, BlockType::Paragraph);
    assert_eq!(config.page_id, None);
    assert_eq!(config.dispatch.after, None);
    assert_eq!(config.dispatch.delay_ms, None);
}

#[test]
fn test_config_builder() {
    let config = ItemConfig::new()
        .page_id(PAGE)
        .max_chars(500)
        .block_type(BlockType::Callout)
        .batch_size(10)
        .after(ANCHOR)
        .delay_ms(250);

    assert_eq!(config.page_id.as_deref(), Some(PAGE));
    assert_eq!(config.max_chars, 500);
    assert_eq!(config.block_type, BlockType::Callout);
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.dispatch.after.as_deref(), Some(ANCHOR));
    assert_eq!(config.dispatch.delay_ms, Some(250));
}

#[test]
fn test_config_from_params() {
    let params = ItemParams {
        page_id: Some(PAGE_DASHLESS.to_string()),
        rich_text: None,
        max_chars: Some(1000),
        block_type: Some("heading_1".to_string()),
        batch_size: Some(50),
        after: Some(ANCHOR.to_string()),
        delay_ms: Some(300),
    };

    let config = ItemConfig::from_params(&params, true).unwrap();
    assert_eq!(config.page_id.as_deref(), Some(PAGE));
    assert_eq!(config.max_chars, 1000);
    assert_eq!(config.block_type, BlockType::Heading1);
    assert_eq!(config.batch_size, 50);
    assert_eq!(config.dispatch.after.as_deref(), Some(ANCHOR));
    assert_eq!(config.dispatch.delay_ms, Some(300));
}

#[test]
fn test_config_rejects_non_positive_numbers() {
    let zero_chars = ItemParams {
        max_chars: Some(0),
        ..ItemParams::default()
    };
    assert_eq!(
        ItemConfig::from_params(&zero_chars, false).unwrap_err(),
        ConfigError::NotPositive {
            field: "maxChars",
            value: 0
        }
    );

    let negative_batch = ItemParams {
        batch_size: Some(-5),
        ..ItemParams::default()
    };
    let err = ItemConfig::from_params(&negative_batch, false).unwrap_err();
    assert!(err.to_string().contains("batchSize"));
}

#[test]
fn test_config_rejects_unknown_block_type() {
    let params = ItemParams {
        block_type: Some("toggle".to_string()),
        ..ItemParams::default()
    };
    let err = ItemConfig::from_params(&params, false).unwrap_err();
    assert!(matches!(err, ConfigError::BlockType(_)));
    assert!(err.to_string().contains("toggle"));
}

#[test]
fn test_config_page_id_required_for_append() {
    let blank = ItemParams {
        page_id: Some("   ".to_string()),
        ..ItemParams::default()
    };

    assert_eq!(
        ItemConfig::from_params(&blank, true).unwrap_err(),
        ConfigError::MissingPageId
    );
    assert!(ItemConfig::from_params(&blank, false).is_ok());
}

#[test]
fn test_config_rejects_bad_ids() {
    let params = ItemParams {
        page_id: Some("definitely not an id".to_string()),
        ..ItemParams::default()
    };
    assert!(matches!(
        ItemConfig::from_params(&params, true).unwrap_err(),
        ConfigError::InvalidId {
            field: "pageId",
            source: IdError::Invalid(_)
        }
    ));

    let params = ItemParams {
        page_id: Some(PAGE.to_string()),
        after: Some("nope".to_string()),
        ..ItemParams::default()
    };
    assert!(matches!(
        ItemConfig::from_params(&params, true).unwrap_err(),
        ConfigError::InvalidId { field: "after", .. }
    ));
}

#[test]
fn test_empty_anchor_is_ignored() {
    let params = ItemParams {
        after: Some(String::new()),
        ..ItemParams::default()
    };
    let config = ItemConfig::from_params(&params, false).unwrap();
    assert_eq!(config.dispatch.after, None);
}

#[test]
fn test_params_deserialize_camel_case() {
    let params: ItemParams = serde_json::from_value(json!({
        "pageId": PAGE,
        "richText": "[{\"type\": \"text\", \"text\": {\"content\": \"Hello\"}}]",
        "maxChars": 1500,
        "blockType": "quote",
        "batchSize": 25,
        "after": ANCHOR,
        "delayMs": 300
    }))
    .unwrap();

    assert_eq!(params.page_id.as_deref(), Some(PAGE));
    assert!(params.rich_text.as_ref().unwrap().is_string());
    assert_eq!(params.max_chars, Some(1500));
    assert_eq!(params.block_type.as_deref(), Some("quote"));
    assert_eq!(params.batch_size, Some(25));
    assert_eq!(params.after.as_deref(), Some(ANCHOR));
    assert_eq!(params.delay_ms, Some(300));
}

#[test]
fn test_negative_delay_means_no_pause() {
    let params: ItemParams = serde_json::from_value(json!({
        "pageId": PAGE,
        "richText": [],
        "delayMs": -50
    }))
    .unwrap();
    assert_eq!(params.delay_ms, Some(-50));

    let config = ItemConfig::from_params(&params, true).unwrap();
    assert_eq!(config.dispatch.delay_ms, None);

    let zero = ItemParams {
        delay_ms: Some(0),
        ..params
    };
    assert_eq!(
        ItemConfig::from_params(&zero, true).unwrap().dispatch.delay_ms,
        None
    );
}

#[test]
fn test_params_or_defaults() {
    let defaults = ItemParams {
        page_id: Some(PAGE.to_string()),
        max_chars: Some(500),
        batch_size: Some(20),
        ..ItemParams::default()
    };
    let item = ItemParams {
        max_chars: Some(100),
        rich_text: Some(json!([])),
        ..ItemParams::default()
    };

    let merged = item.or_defaults(&defaults);
    assert_eq!(merged.page_id.as_deref(), Some(PAGE));
    assert_eq!(merged.max_chars, Some(100));
    assert_eq!(merged.batch_size, Some(20));
    assert_eq!(merged.rich_text, Some(json!([])));
    assert_eq!(merged.block_type, None);
}

#[tokio::test]
async fn test_split_only_preview() {
    let item = ItemParams {
        max_chars: Some(20),
        ..params(json!([
            {"type": "text", "text": {"content": "Hello "}},
            {"type": "text", "text": {"content": "World"}},
        ]))
    };

    let outputs = Runner::new(Operation::SplitOnly).run(&[item]).await.unwrap();
    assert_eq!(outputs.len(), 1);

    let ItemOutcome::Preview(preview) = &outputs[0].outcome else {
        panic!("expected a preview");
    };
    assert_eq!(preview.block_count, 1);
    assert_eq!(preview.preview[0].length, 11);
    assert_eq!(preview.preview[0].preview, "Hello World");
}

#[tokio::test]
async fn test_preview_truncates_long_blocks() {
    let item = params(json!([{"type": "text", "text": {"content": "q".repeat(150)}}]));

    let outputs = Runner::new(Operation::SplitOnly).run(&[item]).await.unwrap();
    let ItemOutcome::Preview(preview) = &outputs[0].outcome else {
        panic!("expected a preview");
    };

    assert_eq!(preview.preview[0].length, 150);
    assert_eq!(preview.preview[0].preview.chars().count(), PREVIEW_CHARS + 3);
    assert!(preview.preview[0].preview.ends_with("..."));
}

#[tokio::test]
async fn test_preview_is_idempotent() {
    let item = ItemParams {
        max_chars: Some(12),
        ..params(json!([{"type": "text", "text": {"content": "word ".repeat(10)}}]))
    };
    let runner = Runner::new(Operation::SplitOnly);

    let first = runner.run(std::slice::from_ref(&item)).await.unwrap();
    let second = runner.run(std::slice::from_ref(&item)).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_split_only_does_not_need_page_id() {
    let item = ItemParams {
        rich_text: Some(json!([])),
        ..ItemParams::default()
    };

    let outputs = Runner::new(Operation::SplitOnly).run(&[item]).await.unwrap();
    let json = serde_json::to_value(&outputs[0]).unwrap();
    assert_eq!(json, json!({"item": 0, "blocks": [], "blockCount": 0, "preview": []}));
}

#[tokio::test]
async fn test_split_only_ignores_page_id_format() {
    let item = ItemParams {
        page_id: Some("my-notes-page".to_string()),
        after: Some("not-a-block".to_string()),
        ..params(json!([{"type": "text", "text": {"content": "hi"}}]))
    };

    let outputs = Runner::new(Operation::SplitOnly).run(&[item]).await.unwrap();
    let ItemOutcome::Preview(preview) = &outputs[0].outcome else {
        panic!("expected a preview");
    };
    assert_eq!(preview.block_count, 1);
    assert_eq!(preview.preview[0].preview, "hi");
}

#[tokio::test(start_paused = true)]
async fn test_append_with_negative_delay() {
    let notion = FakeNotion::default();
    let item: ItemParams = serde_json::from_value(json!({
        "pageId": PAGE,
        "richText": full_segments(3, 10),
        "maxChars": 10,
        "batchSize": 1,
        "delayMs": -1
    }))
    .unwrap();

    let started = tokio::time::Instant::now();
    let outputs = Runner::new(Operation::AppendRichText(&notion))
        .run(&[item])
        .await
        .unwrap();

    assert!(matches!(outputs[0].outcome, ItemOutcome::Appended(_)));
    assert_eq!(notion.call_count(), 3);
    assert_eq!(started.elapsed(), std::time::Duration::ZERO);
}

#[tokio::test]
async fn test_append_in_batches() {
    let notion = FakeNotion::default();
    let item = ItemParams {
        max_chars: Some(10),
        batch_size: Some(100),
        ..params(full_segments(250, 10))
    };

    let outputs = Runner::new(Operation::AppendRichText(&notion))
        .run(&[item])
        .await
        .unwrap();

    let ItemOutcome::Appended(summary) = &outputs[0].outcome else {
        panic!("expected an append summary");
    };
    assert!(summary.success);
    assert_eq!(summary.page_id, PAGE);
    assert_eq!(summary.total_blocks_created, 250);
    assert_eq!(summary.batches_sent, 3);
    assert_eq!(summary.results.len(), 3);

    let sizes: Vec<usize> = notion.calls.lock().unwrap().iter().map(|c| c.1).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
}

#[tokio::test]
async fn test_append_output_shape() {
    let notion = FakeNotion::default();
    let item = params(json!([{"type": "text", "text": {"content": "hi"}}]));

    let outputs = Runner::new(Operation::AppendRichText(&notion))
        .run(&[item])
        .await
        .unwrap();
    let json = serde_json::to_value(&outputs[0]).unwrap();

    assert_eq!(json["item"], 0);
    assert_eq!(json["success"], true);
    assert_eq!(json["pageId"], PAGE);
    assert_eq!(json["totalBlocksCreated"], 1);
    assert_eq!(json["batchesSent"], 1);
    assert_eq!(json["results"][0]["object"], "list");
}

#[tokio::test]
async fn test_append_uses_sanitized_page_and_anchor() {
    let notion = FakeNotion::default();
    let item = ItemParams {
        page_id: Some(format!("https://www.notion.so/Plan-{PAGE_DASHLESS}")),
        after: Some(ANCHOR.to_string()),
        max_chars: Some(5),
        batch_size: Some(2),
        ..params(full_segments(5, 5))
    };

    Runner::new(Operation::AppendRichText(&notion))
        .run(&[item])
        .await
        .unwrap();

    let calls = notion.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.0 == PAGE));
    assert_eq!(calls[0].2.as_deref(), Some(ANCHOR));
    assert!(calls[1..].iter().all(|c| c.2.is_none()));
}

#[tokio::test]
async fn test_empty_input_makes_no_calls() {
    let notion = FakeNotion::default();
    let item = params(json!([]));

    let outputs = Runner::new(Operation::AppendRichText(&notion))
        .run(&[item])
        .await
        .unwrap();

    let ItemOutcome::Appended(summary) = &outputs[0].outcome else {
        panic!("expected an append summary");
    };
    assert_eq!(summary.total_blocks_created, 0);
    assert_eq!(summary.batches_sent, 0);
    assert!(summary.results.is_empty());
    assert_eq!(notion.call_count(), 0);
}

#[tokio::test]
async fn test_mid_dispatch_failure_fails_whole_item() {
    let notion = FakeNotion::failing_on(2);
    let item = ItemParams {
        max_chars: Some(10),
        ..params(full_segments(250, 10))
    };

    let err = Runner::new(Operation::AppendRichText(&notion))
        .run(&[item])
        .await
        .unwrap_err();

    assert_eq!(err.item(), 0);
    match err {
        SplitterError::RemoteWrite { source, .. } => {
            assert_eq!(source.failed_batch, 2);
            assert_eq!(source.committed.total_blocks_created, 100);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(notion.call_count(), 2);
}

#[tokio::test]
async fn test_continue_on_fail_records_single_failure() {
    let notion = FakeNotion::failing_on(2);
    let item = ItemParams {
        max_chars: Some(10),
        ..params(full_segments(250, 10))
    };

    let outputs = Runner::new(Operation::AppendRichText(&notion))
        .continue_on_fail(true)
        .run(&[item])
        .await
        .unwrap();

    assert_eq!(outputs.len(), 1);
    let json = serde_json::to_value(&outputs[0]).unwrap();
    assert!(json["error"].as_str().unwrap().contains("batch 2 of 3"));
    assert!(json.get("totalBlocksCreated").is_none());
    assert!(json.get("success").is_none());
}

#[tokio::test]
async fn test_malformed_item_with_continue_on_fail() {
    let notion = FakeNotion::default();
    let items = vec![
        params(json!([{"type": "text", "text": {"content": "first"}}])),
        params(json!("[{broken")),
        params(json!([{"type": "text", "text": {"content": "third"}}])),
    ];

    let outputs = Runner::new(Operation::AppendRichText(&notion))
        .continue_on_fail(true)
        .run(&items)
        .await
        .unwrap();

    assert_eq!(outputs.len(), 3);
    assert!(matches!(outputs[0].outcome, ItemOutcome::Appended(_)));
    assert_eq!(outputs[1].item, 1);
    let ItemOutcome::Failed(failure) = &outputs[1].outcome else {
        panic!("expected a failure record");
    };
    assert!(failure.error.contains("Invalid rich text JSON format"));
    assert!(matches!(outputs[2].outcome, ItemOutcome::Appended(_)));
    assert_eq!(notion.call_count(), 2);
}

#[tokio::test]
async fn test_failure_halts_remaining_items() {
    let notion = FakeNotion::default();
    let items = vec![
        params(json!([{"type": "text", "text": {"content": "first"}}])),
        params(json!({"not": "an array"})),
        params(json!([{"type": "text", "text": {"content": "third"}}])),
    ];

    let err = Runner::new(Operation::AppendRichText(&notion))
        .run(&items)
        .await
        .unwrap_err();

    assert!(matches!(err, SplitterError::MalformedInput { item: 1, .. }));
    assert_eq!(notion.call_count(), 1);
}

#[tokio::test]
async fn test_invalid_config_reported_per_item() {
    let notion = FakeNotion::default();
    let item = ItemParams {
        batch_size: Some(0),
        ..params(json!([]))
    };

    let err = Runner::new(Operation::AppendRichText(&notion))
        .run(&[item])
        .await
        .unwrap_err();

    assert!(matches!(err, SplitterError::InvalidConfig { item: 0, .. }));
    assert!(err.to_string().contains("batchSize"));
}
