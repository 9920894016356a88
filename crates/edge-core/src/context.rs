//! Request context with identity, locale and timing.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::lifecycle::TimingContext;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

static SEQUENCE: AtomicU32 = AtomicU32::new(0);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}-{:04x}", nanos, std::process::id(), seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Language and country a page is rendered for.
///
/// Both parts are upper-case ISO codes (`EN`, `US`), matching the values the
/// storefront API expects for its `@inContext` directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    /// ISO 639-1 language code.
    pub language: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}

impl Locale {
    /// Create a locale from language and country codes.
    pub fn new(language: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            language: language.into().to_ascii_uppercase(),
            country: country.into().to_ascii_uppercase(),
        }
    }

    /// Parse a path segment such as `en-us` or `fr-CA`.
    ///
    /// Returns `None` for anything that is not two two-letter codes joined
    /// by a dash.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        let (language, country) = segment.split_once('-')?;
        let valid = |part: &str| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic());
        if !valid(language) || !valid(country) {
            return None;
        }
        Some(Self::new(language, country))
    }

    /// Path prefix for this locale, e.g. `/en-us`.
    pub fn path_prefix(&self) -> String {
        format!(
            "/{}-{}",
            self.language.to_ascii_lowercase(),
            self.country.to_ascii_lowercase()
        )
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("EN", "US")
    }
}

/// Typed request context passed to loaders and renderers.
#[derive(Debug)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// Request path.
    pub path: String,
    /// Locale resolved from the path (or the default).
    pub locale: Locale,
    /// Timing context for observability.
    pub timing: TimingContext,
}

impl RequestContext {
    /// Create a new request context with the default locale.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            path: path.into(),
            locale: Locale::default(),
            timing: TimingContext::new(),
        }
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Reuse an upstream request ID (e.g. from `x-request-id`).
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }
}
