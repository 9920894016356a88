//! Outcome of a deferred load.

/// What a deferred load resolves to.
///
/// There is no error variant: every failure on the deferred path is absorbed
/// into `Unavailable`, which renders as an empty state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredValue<T> {
    /// The load succeeded.
    Ready(T),
    /// The load failed, panicked or timed out.
    Unavailable,
}

impl<T> DeferredValue<T> {
    /// Whether this is the `Unavailable` sentinel.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Convert into an `Option`, dropping the sentinel.
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Unavailable => None,
        }
    }

    /// Borrow the resolved value.
    pub fn as_ref(&self) -> DeferredValue<&T> {
        match self {
            Self::Ready(value) => DeferredValue::Ready(value),
            Self::Unavailable => DeferredValue::Unavailable,
        }
    }

    /// Map the resolved value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> DeferredValue<U> {
        match self {
            Self::Ready(value) => DeferredValue::Ready(f(value)),
            Self::Unavailable => DeferredValue::Unavailable,
        }
    }

    /// Resolved value, or the type's empty state for `Unavailable`.
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.ready().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for DeferredValue<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unavailable, Self::Ready)
    }
}
