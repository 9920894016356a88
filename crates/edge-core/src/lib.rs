//! Core abstractions for the streaming storefront platform.
//!
//! This crate provides the fundamental types:
//! - `RequestContext` - Per-request identity, locale and timing
//! - `Locale` - Language/country pair resolved from the path
//! - `LoadPhase` / `PageLifecycle` - Critical/deferred load state machine
//! - `StorefrontConfig` - Layered file + environment configuration
//! - `WorkloadError` - Streaming protocol errors

mod config;
mod context;
mod error;
mod lifecycle;

pub use config::*;
pub use context::*;
pub use error::*;
pub use lifecycle::*;
