use avatar_prompt_core::prompt::Prompt;

/// Requests avatar generation for a picked prompt. The backend is an
/// external collaborator; implementations live with the runtime binaries.
pub trait AvatarGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<(), String>;
}
