//! Environment resolution happens once here, at the composition root; the
//! store and handlers receive explicit values and never read the
//! environment themselves.

use thiserror::Error;

use avatar_prompt_core::prompt::DEFAULT_ALIAS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{variable} must be configured")]
pub struct ConfigError {
    variable: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub table_name: String,
    pub cors_domain: String,
    pub alias: String,
    /// Local DynamoDB endpoint override for development; unset in AWS.
    pub dynamo_endpoint: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            table_name: require(&lookup, "DYNAMO_TABLE_NAME")?,
            cors_domain: require(&lookup, "CORS_DOMAIN")?,
            alias: lookup("PROMPT_ALIAS").unwrap_or_else(|| DEFAULT_ALIAS.to_string()),
            dynamo_endpoint: lookup("DYNAMO_ENDPOINT"),
        })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    variable: &'static str,
) -> Result<String, ConfigError> {
    match lookup(variable) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError { variable }),
    }
}
