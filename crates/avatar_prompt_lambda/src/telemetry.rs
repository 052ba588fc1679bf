use tracing_subscriber::EnvFilter;

/// Installs the JSON log subscriber for a runtime binary. CloudWatch gets
/// one JSON object per line; `RUST_LOG` narrows the filter.
pub fn init() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
