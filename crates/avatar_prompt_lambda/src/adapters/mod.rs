//! Collaborator seams and their AWS implementations.

pub mod dynamo;
pub mod generate;
pub mod store;
