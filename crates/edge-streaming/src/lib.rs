//! Streaming primitives for shell-first, patch-later SSR.
//!
//! This crate enforces the progressive rendering contract:
//! - `StreamingSink` - Initial response at most once, each patch at most once after it
//! - `Shell` - Document frame around the streamed sections
//! - `Boundary` - Fallback placeholder that a later patch replaces in place

mod boundary;
mod shell;
mod sink;

pub use boundary::*;
pub use shell::*;
pub use sink::*;
