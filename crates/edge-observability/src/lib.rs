//! Observability infrastructure for the streaming storefront.
//!
//! This crate provides:
//! - `init_tracing` - Process-wide `tracing` subscriber setup
//! - `StructuredLogger` - Request-scoped structured logging over `tracing`
//! - `MetricsCollector` - Time to critical data, shell and each patch

mod init;
mod logging;
mod metrics;

pub use init::*;
pub use logging::*;
pub use metrics::*;

// Re-export from edge-core for convenience
pub use edge_core::{LogFormat, ParseLogFormatError, RequestId, TimingContext};
