//! HTTP-triggered operations, invoked through the request adapter.

use serde::Deserialize;
use tracing::info;

use avatar_prompt_core::prompt::{Prompt, PromptDraft};

use crate::adapters::store::PromptStore;
use crate::apigw::casing::camelize_keys;
use crate::apigw::{bind_json, ApiResult, AuthContext, BindError, BindModel, HandlerError};

impl BindModel for PromptDraft {
    fn model_name() -> &'static str {
        "Prompt"
    }

    fn bind(body: Option<&str>) -> Result<Self, BindError> {
        bind_json(body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetPromptParams {
    pub id: String,
}

/// Validates, persists, and echoes back a new prompt. The alias rule runs
/// here, not during binding, so its failure takes the generic 500 path.
pub fn save_prompt(
    store: &impl PromptStore,
    alias: &str,
    draft: PromptDraft,
    auth: Option<&AuthContext>,
) -> Result<ApiResult, HandlerError> {
    let prompt = Prompt::from_draft(draft, alias)?;
    store.save(&prompt)?;

    info!(
        prompt_id = %prompt.id,
        principal = auth.map(|auth| auth.principal_id.as_str()),
        "prompt saved",
    );
    ApiResult::record(&prompt)
}

pub fn get_prompt(
    store: &impl PromptStore,
    params: GetPromptParams,
) -> Result<ApiResult, HandlerError> {
    match store.from_id(&params.id)? {
        Some(prompt) => ApiResult::record(&prompt),
        None => Ok(ApiResult::None),
    }
}

/// Prompts used so far this month, most recently used first.
pub fn latest_prompts(store: &impl PromptStore) -> Result<ApiResult, HandlerError> {
    let prompts = store
        .latest()?
        .iter()
        .map(|prompt| serde_json::to_value(prompt).map(camelize_keys))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiResult::Record(serde_json::json!({ "prompts": prompts })))
}

#[cfg(test)]
pub(crate) mod test_store {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use avatar_prompt_core::prompt::Prompt;

    use crate::adapters::store::{PromptStore, StorageError};

    /// In-memory stand-in for the DynamoDB store. `latest` keeps every used
    /// prompt; the month cutoff is covered by the store's own tests.
    #[derive(Default)]
    pub struct MemoryStore {
        pub prompts: Mutex<BTreeMap<String, Prompt>>,
        pub fail_writes: bool,
    }

    impl MemoryStore {
        pub fn with_prompts(prompts: impl IntoIterator<Item = Prompt>) -> Self {
            let store = Self::default();
            {
                let mut guard = store.prompts.lock().expect("poisoned mutex");
                for prompt in prompts {
                    guard.insert(prompt.id.clone(), prompt);
                }
            }
            store
        }

        pub fn get(&self, id: &str) -> Option<Prompt> {
            self.prompts.lock().expect("poisoned mutex").get(id).cloned()
        }
    }

    impl PromptStore for MemoryStore {
        fn save(&self, prompt: &Prompt) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::new("injected write failure"));
            }
            self.prompts
                .lock()
                .expect("poisoned mutex")
                .insert(prompt.id.clone(), prompt.clone());
            Ok(())
        }

        fn from_id(&self, id: &str) -> Result<Option<Prompt>, StorageError> {
            Ok(self.get(id))
        }

        fn unused_ids(&self) -> Result<Vec<String>, StorageError> {
            let guard = self.prompts.lock().expect("poisoned mutex");
            let mut unused: Vec<&Prompt> =
                guard.values().filter(|prompt| prompt.used_at.is_none()).collect();
            unused.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(unused.into_iter().map(|prompt| prompt.id.clone()).collect())
        }

        fn latest(&self) -> Result<Vec<Prompt>, StorageError> {
            let guard = self.prompts.lock().expect("poisoned mutex");
            let mut used: Vec<Prompt> = guard
                .values()
                .filter(|prompt| prompt.used_at.is_some())
                .cloned()
                .collect();
            used.sort_by(|a, b| b.used_at.cmp(&a.used_at));
            Ok(used)
        }
    }
}
