use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default alias every prompt text must mention. Deployments can override it
/// through configuration.
pub const DEFAULT_ALIAS: &str = "jairtrejo";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("prompt must contain the alias ({alias})")]
pub struct ValidationError {
    alias: String,
}

impl ValidationError {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }
}

/// A text prompt and its usage state.
///
/// `used_at` stays `None` until the prompt has driven an avatar generation;
/// the store relies on its absence to keep the used-at index sparse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prompt {
    pub id: String,
    pub prompt: String,
    pub created_at: i64,
    pub used_at: Option<i64>,
}

/// Construction input for a [`Prompt`], as bound from a request body.
///
/// Unknown fields are a shape mismatch and fail deserialization.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PromptDraft {
    pub prompt: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl Prompt {
    /// Builds a prompt with generated defaults. Fails before any persistence
    /// when the text does not contain the required alias substring.
    pub fn new(prompt: impl Into<String>, alias: &str) -> Result<Self, ValidationError> {
        Self::from_draft(
            PromptDraft {
                prompt: prompt.into(),
                id: None,
                created_at: None,
            },
            alias,
        )
    }

    pub fn from_draft(draft: PromptDraft, alias: &str) -> Result<Self, ValidationError> {
        if !draft.prompt.contains(alias) {
            return Err(ValidationError::new(alias));
        }

        Ok(Self {
            id: draft.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            prompt: draft.prompt,
            created_at: draft.created_at.unwrap_or_else(now_timestamp),
            used_at: None,
        })
    }

    /// Marks the prompt used now. A second call simply overwrites `used_at`.
    pub fn mark_used(&mut self) {
        self.used_at = Some(now_timestamp());
    }
}

fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_text_without_alias() {
        let error = Prompt::new("a portrait of someone else", DEFAULT_ALIAS)
            .expect_err("missing alias should fail validation");
        assert_eq!(error, ValidationError::new(DEFAULT_ALIAS));
    }

    #[test]
    fn builds_prompt_with_defaults() {
        let prompt = Prompt::new("a portrait of jairtrejo as an astronaut", DEFAULT_ALIAS)
            .expect("valid text should construct");

        assert!(!prompt.id.is_empty());
        assert!(prompt.created_at > 0);
        assert_eq!(prompt.used_at, None);
    }

    #[test]
    fn draft_fields_override_defaults() {
        let draft = PromptDraft {
            prompt: "jairtrejo in watercolor".to_string(),
            id: Some("prompt-1".to_string()),
            created_at: Some(1_700_000_000),
        };

        let prompt = Prompt::from_draft(draft, DEFAULT_ALIAS).expect("valid draft");
        assert_eq!(prompt.id, "prompt-1");
        assert_eq!(prompt.created_at, 1_700_000_000);
        assert_eq!(prompt.used_at, None);
    }

    #[test]
    fn respects_configured_alias() {
        assert!(Prompt::new("a drawing of somebody", "somebody").is_ok());
        assert!(Prompt::new("a drawing of jairtrejo", "somebody").is_err());
    }

    #[test]
    fn mark_used_sets_and_overwrites_timestamp() {
        let mut prompt =
            Prompt::new("jairtrejo at the beach", DEFAULT_ALIAS).expect("valid text");

        prompt.mark_used();
        let first = prompt.used_at.expect("used_at should be set");
        assert!(first >= prompt.created_at);

        prompt.mark_used();
        let second = prompt.used_at.expect("used_at should stay set");
        assert!(second >= first);
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let prompt = Prompt {
            id: "prompt-1".to_string(),
            prompt: "jairtrejo as a robot".to_string(),
            created_at: 100,
            used_at: Some(200),
        };

        let value = serde_json::to_value(&prompt).expect("prompt should serialize");
        assert_eq!(value["id"], "prompt-1");
        assert_eq!(value["created_at"], 100);
        assert_eq!(value["used_at"], 200);
    }

    #[test]
    fn draft_rejects_unknown_fields() {
        let result: Result<PromptDraft, _> = serde_json::from_value(serde_json::json!({
            "prompt": "jairtrejo somewhere",
            "img_src": "https://example.com/a.png",
        }));
        assert!(result.is_err());
    }
}
