//! Subscriber setup.

use edge_core::LogFormat;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Fails if a
/// subscriber is already installed.
pub fn init_tracing(
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
        LogFormat::Human => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    }
}
