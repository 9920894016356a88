//! Data models for the storefront home page.

mod collection;
mod product;

pub use collection::*;
pub use product::*;

use serde::{Deserialize, Serialize};

/// Image as returned by the storefront API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl Image {
    /// Alt text, falling back to the owner's title.
    pub fn alt_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.alt_text
            .as_deref()
            .filter(|alt| !alt.is_empty())
            .unwrap_or(fallback)
    }
}

/// GraphQL connection wrapper (`{ nodes: [...] }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}
