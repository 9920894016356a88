//! Timeout configuration for backend queries.

use std::time::Duration;

/// Timeout configuration for a query client.
///
/// Both limits are optional. With neither set, a hung backend keeps the
/// query pending until the transport gives up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection establishment timeout.
    pub connect: Option<Duration>,
    /// Total operation timeout.
    pub total: Option<Duration>,
}

impl TimeoutConfig {
    /// No client-side timeouts.
    pub fn none() -> Self {
        Self::default()
    }

    /// Create from a single total timeout, connecting within a quarter of it.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: Some(total / 4),
            total: Some(total),
        }
    }

    /// Create from an optional total timeout.
    pub fn from_optional(total: Option<Duration>) -> Self {
        total.map(Self::from_total).unwrap_or_default()
    }

    /// Whether any limit is set.
    pub fn is_bounded(&self) -> bool {
        self.connect.is_some() || self.total.is_some()
    }
}
