use thiserror::Error;

use avatar_prompt_core::prompt::Prompt;

/// An I/O failure talking to the backing table. Never retried here; retry
/// policy belongs to the triggering layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("prompt store operation failed: {message}")]
pub struct StorageError {
    message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Persistence operations over prompt records.
///
/// The store is the sole writer of durable state. Reads are index scans and
/// are not transactionally consistent with concurrent writes.
pub trait PromptStore {
    /// Upserts by id, writing every field except `id`. An unset `used_at`
    /// is omitted from the write, never stored as an explicit null.
    fn save(&self, prompt: &Prompt) -> Result<(), StorageError>;

    /// Point lookup; `None` when absent.
    fn from_id(&self, id: &str) -> Result<Option<Prompt>, StorageError>;

    /// Ids of prompts with no `used_at`, sorted by `created_at` descending.
    /// Empty when none are unused.
    fn unused_ids(&self) -> Result<Vec<String>, StorageError>;

    /// Prompts used since the first moment of the current calendar month,
    /// sorted by `used_at` descending.
    fn latest(&self) -> Result<Vec<Prompt>, StorageError>;
}
