//! Backend query layer for the streaming storefront.
//!
//! This crate provides:
//! - `Query` / `QueryContext` - Opaque GraphQL request descriptors
//! - `QueryClient` - Executor interface the loaders depend on
//! - `StorefrontClient` - GraphQL-over-HTTP implementation
//! - `TimeoutConfig` - Optional client-side timeouts

mod client;
mod query;
mod timeout;

pub use client::*;
pub use query::*;
pub use timeout::*;
