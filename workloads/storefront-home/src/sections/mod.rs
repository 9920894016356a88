//! Section renderers for the storefront home page.

mod featured;
mod html;
mod recommendations;

pub use featured::*;
pub use html::escape_html;
pub use recommendations::*;
