//! Deferred execution for data streamed after the initial response.
//!
//! This crate provides:
//! - `defer` - Start a fallible load in its own task, returning immediately
//! - `Deferred` - Single-assignment handle that never fails outward
//! - `DeferredValue` - Resolved value or the `Unavailable` sentinel

mod deferred;
mod fallback;

pub use deferred::*;
pub use fallback::*;
