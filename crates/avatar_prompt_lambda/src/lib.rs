//! AWS-oriented adapters and handlers for the avatar prompt service.
//!
//! This crate owns runtime integration details: the API Gateway request
//! adapter, the DynamoDB prompt store, queue and schedule handlers, and the
//! Lambda runtime binaries. Domain rules live in `avatar_prompt_core`.

pub mod adapters;
pub mod apigw;
pub mod config;
pub mod handlers;
pub mod telemetry;
