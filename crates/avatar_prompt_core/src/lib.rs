//! Avatar prompt domain primitives.
//!
//! This crate owns the prompt entity, its validation rules, and the weighted
//! selection policy. It intentionally excludes AWS SDK and Lambda runtime
//! concerns; those live in `crates/avatar_prompt_lambda`.

pub mod prompt;
pub mod selection;
