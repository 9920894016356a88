//! Fallback boundaries that are patched in place once deferred data lands.
//!
//! The initial response carries `<div id="b:{id}">fallback</div>`. The patch
//! arrives later in the same body as a `<template id="p:{id}">` followed by a
//! call to `$swap`, which [`SWAP_RUNTIME`] defines in the document head.

/// Client-side runtime that swaps a placeholder for its patch template.
pub const SWAP_RUNTIME: &str = r#"function $swap(id){var b=document.getElementById("b:"+id),t=document.getElementById("p:"+id);if(!b||!t)return;b.replaceWith(t.content.cloneNode(true));t.remove();}"#;

/// A named region rendered as a fallback now and patched later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    id: String,
    fallback: String,
}

impl Boundary {
    /// Create a boundary with an empty fallback.
    ///
    /// Ids are used inside element ids and a script call, so anything other
    /// than ASCII alphanumerics, `-` and `_` is replaced with `-`.
    pub fn new(id: &str) -> Self {
        let id = id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        Self {
            id,
            fallback: String::new(),
        }
    }

    /// Set the fallback HTML shown until the patch arrives.
    pub fn with_fallback(mut self, html: impl Into<String>) -> Self {
        self.fallback = html.into();
        self
    }

    /// Boundary id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fallback HTML.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Render the placeholder that goes into the initial response.
    pub fn render_placeholder(&self) -> String {
        format!(
            r#"<div id="b:{id}" data-boundary="{id}">{fallback}</div>"#,
            id = self.id,
            fallback = self.fallback
        )
    }

    /// Render the out-of-band patch that replaces the placeholder.
    pub fn render_patch(&self, content: &str) -> String {
        format!(
            r#"<template id="p:{id}">{content}</template><script>$swap("{id}")</script>"#,
            id = self.id,
            content = content
        )
    }

    /// Render resolved data as an inert JSON script correlated to this boundary.
    pub fn render_data(&self, json: &str) -> String {
        format!(
            r#"<script type="application/json" data-deferred="{id}">{json}</script>"#,
            id = self.id,
            json = escape_script_json(json)
        )
    }
}

/// Make JSON safe to embed inside a `<script>` element.
pub fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
