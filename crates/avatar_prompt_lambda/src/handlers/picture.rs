//! Queue-triggered picture updates.
//!
//! When a generated avatar comes back through the Lambda destination queue,
//! each record's body carries the generator's `responsePayload` with the
//! prompt id. The prompt is marked used and saved; everything downstream of
//! that (publishing the picture) is an external concern.

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use avatar_prompt_core::prompt::Prompt;

use crate::adapters::store::{PromptStore, StorageError};

#[derive(Debug, Error)]
pub enum PictureError {
    #[error("queue event must include a Records array")]
    MissingRecords,
    #[error("queue record body must be a string")]
    MalformedRecordBody,
    #[error("queue record body is not valid JSON: {0}")]
    MalformedPayload(String),
    #[error("queue record is missing the response payload id: {0}")]
    MissingPayloadId(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("prompt {0} is not stored")]
    MissingPrompt(String),
}

/// Extracts the prompt ids carried by a queue event's records.
pub fn decode_queue_records(event: &Value) -> Result<Vec<String>, PictureError> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or(PictureError::MissingRecords)?;

    let mut ids = Vec::with_capacity(records.len());
    for record in records {
        let body = record
            .get("body")
            .and_then(Value::as_str)
            .ok_or(PictureError::MalformedRecordBody)?;
        let payload: Value = serde_json::from_str(body)
            .map_err(|error| PictureError::MalformedPayload(error.to_string()))?;

        let id = payload
            .get("responsePayload")
            .and_then(|payload| payload.get("id"))
            .and_then(Value::as_str)
            .ok_or_else(|| PictureError::MissingPayloadId(body.to_string()))?;
        ids.push(id.to_string());
    }

    Ok(ids)
}

/// Marks the prompt used and persists it.
pub fn update_picture(store: &impl PromptStore, id: &str) -> Result<Prompt, PictureError> {
    let mut prompt = store
        .from_id(id)?
        .ok_or_else(|| PictureError::MissingPrompt(id.to_string()))?;

    prompt.mark_used();
    store.save(&prompt)?;

    info!(prompt_id = %prompt.id, used_at = prompt.used_at, "prompt marked used");
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::handlers::api::test_store::MemoryStore;

    use super::*;

    fn queue_event(ids: &[&str]) -> Value {
        let records: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "body": json!({"responsePayload": {"id": id}}).to_string(),
                })
            })
            .collect();
        json!({ "Records": records })
    }

    #[test]
    fn decodes_prompt_ids_from_records() {
        let ids = decode_queue_records(&queue_event(&["prompt-1", "prompt-2"]))
            .expect("well-formed event");
        assert_eq!(ids, vec!["prompt-1", "prompt-2"]);
    }

    #[test]
    fn rejects_events_without_records() {
        let error = decode_queue_records(&json!({})).expect_err("missing Records should fail");
        assert!(matches!(error, PictureError::MissingRecords));
    }

    #[test]
    fn rejects_non_string_record_bodies() {
        let error = decode_queue_records(&json!({"Records": [{"body": 42}]}))
            .expect_err("non-string body should fail");
        assert!(matches!(error, PictureError::MalformedRecordBody));
    }

    #[test]
    fn rejects_record_bodies_that_are_not_json() {
        let error = decode_queue_records(&json!({"Records": [{"body": "not json"}]}))
            .expect_err("non-JSON body should fail");
        assert!(matches!(error, PictureError::MalformedPayload(_)));
    }

    #[test]
    fn rejects_payloads_without_an_id() {
        let event = json!({
            "Records": [{"body": json!({"responsePayload": {}}).to_string()}],
        });
        let error = decode_queue_records(&event).expect_err("missing id should fail");
        assert!(matches!(error, PictureError::MissingPayloadId(_)));
    }

    #[test]
    fn marks_the_prompt_used_and_saves_it() {
        let prompt = Prompt {
            id: "prompt-1".to_string(),
            prompt: "jairtrejo as a sailor".to_string(),
            created_at: 100,
            used_at: None,
        };
        let store = MemoryStore::with_prompts([prompt]);

        let updated = update_picture(&store, "prompt-1").expect("update should succeed");

        assert!(updated.used_at.is_some());
        let stored = store.get("prompt-1").expect("prompt should still be stored");
        assert_eq!(stored.used_at, updated.used_at);
    }

    #[test]
    fn fails_for_unknown_prompts() {
        let store = MemoryStore::default();
        let error = update_picture(&store, "missing").expect_err("unknown id should fail");
        assert!(matches!(error, PictureError::MissingPrompt(_)));
    }
}
