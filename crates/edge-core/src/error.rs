//! Streaming protocol errors.

/// Error type for workload streaming operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkloadError {
    #[error("Shell not sent before sections")]
    ShellNotSent,

    #[error("Shell already sent")]
    ShellAlreadySent,

    #[error("Patch for boundary '{0}' already sent")]
    PatchAlreadySent(String),

    #[error("Response already completed")]
    Completed,

    #[error("Streaming error: {0}")]
    StreamError(String),
}

impl WorkloadError {
    /// Whether the error means the client went away rather than a protocol bug.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::StreamError(_))
    }
}
