//! Storefront home page.
//!
//! Demonstrates the critical/deferred split:
//! - The featured collection is awaited before anything is sent; if it
//!   fails the whole page fails
//! - Recommended products load in their own task and stream in behind a
//!   skeleton fallback; if they fail the page still renders, with an empty grid
//! - Locale-aware queries (`/` or `/{language}-{country}`)

pub mod data;
pub mod loader;
pub mod queries;
pub mod render;
pub mod sections;
pub mod server;

pub use loader::{
    load_critical_data, load_deferred_data, loader, CriticalData, DeferredData, LoadError,
    PageData,
};
pub use render::{home_shell, render_page, stream_page, PageTrace, StreamOutcome};
pub use server::router;
