//! Schedule-triggered prompt selection.
//!
//! Picks one unused prompt, favoring the recently created half 2:1, and
//! hands it to the avatar generator. The prompt is not marked used here;
//! that happens when the generated picture comes back through the queue.

use rand::Rng;
use thiserror::Error;
use tracing::info;

use avatar_prompt_core::prompt::Prompt;
use avatar_prompt_core::selection::{self, NoAvailableItemsError};

use crate::adapters::generate::AvatarGenerator;
use crate::adapters::store::{PromptStore, StorageError};

#[derive(Debug, Error)]
pub enum PickError {
    #[error(transparent)]
    NoAvailable(#[from] NoAvailableItemsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("picked prompt {0} is no longer stored")]
    MissingPrompt(String),
    #[error("failed to request avatar generation: {0}")]
    Generate(String),
}

pub fn pick_prompt(
    store: &impl PromptStore,
    generator: &dyn AvatarGenerator,
    rng: &mut impl Rng,
) -> Result<Prompt, PickError> {
    let ids = store.unused_ids()?;
    let id = selection::pick_unused(&ids, rng)?.to_string();

    let prompt = store
        .from_id(&id)?
        .ok_or_else(|| PickError::MissingPrompt(id.clone()))?;

    generator
        .generate(&prompt)
        .map_err(PickError::Generate)?;

    info!(prompt_id = %prompt.id, candidates = ids.len(), "prompt picked");
    Ok(prompt)
}
