//! Page load lifecycle tracking.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Load phases for a single page request.
///
/// ```text
/// Pending -> CriticalResolved -> DeferredResolved | DeferredUnavailable
/// Pending -> CriticalFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadPhase {
    /// Request received, critical data in flight.
    Pending,
    /// Critical data resolved; the initial response may be sent.
    CriticalResolved,
    /// Deferred data resolved and patched in.
    DeferredResolved,
    /// Deferred data failed; the empty state was patched in.
    DeferredUnavailable,
    /// Critical data failed; the request ends with a page error.
    CriticalFailed,
}

impl LoadPhase {
    /// Check whether `next` is a legal successor of this phase.
    pub fn can_transition_to(self, next: LoadPhase) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::CriticalResolved)
                | (Self::Pending, Self::CriticalFailed)
                | (Self::CriticalResolved, Self::DeferredResolved)
                | (Self::CriticalResolved, Self::DeferredUnavailable)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::DeferredResolved | Self::DeferredUnavailable | Self::CriticalFailed
        )
    }

    /// Stable name for logs and timing marks.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::CriticalResolved => "critical_resolved",
            Self::DeferredResolved => "deferred_resolved",
            Self::DeferredUnavailable => "deferred_unavailable",
            Self::CriticalFailed => "critical_failed",
        }
    }
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected phase transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Illegal load transition {from} -> {to}")]
pub struct TransitionError {
    pub from: LoadPhase,
    pub to: LoadPhase,
}

/// Tracks the phase of one request and timestamps every transition.
#[derive(Debug, Clone)]
pub struct PageLifecycle {
    phase: LoadPhase,
    timing: TimingContext,
}

impl PageLifecycle {
    /// Start a lifecycle in `Pending`.
    pub fn new(timing: TimingContext) -> Self {
        Self {
            phase: LoadPhase::Pending,
            timing,
        }
    }

    /// Move to the next phase, rejecting illegal transitions.
    pub fn advance(&mut self, next: LoadPhase) -> Result<(), TransitionError> {
        if !self.phase.can_transition_to(next) {
            return Err(TransitionError {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        self.timing.mark(next.name());
        Ok(())
    }

    /// Current phase.
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Timing marks recorded so far.
    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark. Later marks with the same name win.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Time from start to a named mark.
    pub fn since_start(&self, name: &str) -> Option<Duration> {
        self.marks.get(name).map(|t| t.duration_since(self.start))
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get time to shell flush.
    pub fn time_to_shell(&self) -> Option<Duration> {
        self.since_start("shell_sent")
    }

    /// Check whether mark `a` was recorded no later than mark `b`.
    pub fn happened_before(&self, a: &str, b: &str) -> Option<bool> {
        Some(self.marks.get(a)? <= self.marks.get(b)?)
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}
