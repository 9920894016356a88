//! Per-request timing metrics.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use edge_core::RequestId;
use serde::Serialize;

/// Timing metrics for a single page request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestMetrics {
    /// Request ID for correlation.
    pub request_id: String,
    /// Route path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Time until the critical data resolved (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_critical_us: Option<u64>,
    /// Time to shell flush (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_shell_us: Option<u64>,
    /// Boundary patch timings, keyed by boundary id.
    pub boundaries: BTreeMap<String, BoundaryMetrics>,
    /// Total request duration (microseconds).
    pub total_duration_us: u64,
    /// HTTP status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Metrics for a single deferred boundary.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BoundaryMetrics {
    /// Time from request start to patch sent (microseconds).
    pub patched_us: u64,
    /// Whether the patch rendered the unavailable state.
    pub unavailable: bool,
}

/// Collector for request metrics.
#[derive(Debug)]
pub struct MetricsCollector {
    request_id: RequestId,
    route: Option<String>,
    start: Instant,
    critical_resolved: Option<Instant>,
    shell_sent: Option<Instant>,
    boundaries: BTreeMap<String, (Instant, bool)>,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            route: None,
            start: Instant::now(),
            critical_resolved: None,
            shell_sent: None,
            boundaries: BTreeMap::new(),
        }
    }

    /// Set route path.
    pub fn set_route(&mut self, route: impl Into<String>) {
        self.route = Some(route.into());
    }

    /// Record critical data resolved.
    pub fn record_critical_resolved(&mut self) {
        self.critical_resolved = Some(Instant::now());
    }

    /// Record shell sent.
    pub fn record_shell_sent(&mut self) {
        self.shell_sent = Some(Instant::now());
    }

    /// Record a boundary patch. `unavailable` marks the empty-state fallback.
    pub fn record_boundary_patched(&mut self, boundary_id: &str, unavailable: bool) {
        self.boundaries
            .insert(boundary_id.to_string(), (Instant::now(), unavailable));
    }

    /// Get time-to-shell so far.
    pub fn time_to_shell(&self) -> Option<Duration> {
        self.shell_sent.map(|t| t.duration_since(self.start))
    }

    /// Get total elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finalize and return the metrics.
    pub fn finalize(self, status_code: Option<u16>) -> RequestMetrics {
        let start = self.start;
        let since = |t: Instant| t.duration_since(start).as_micros() as u64;

        RequestMetrics {
            request_id: self.request_id.to_string(),
            route: self.route,
            time_to_critical_us: self.critical_resolved.map(since),
            time_to_shell_us: self.shell_sent.map(since),
            boundaries: self
                .boundaries
                .into_iter()
                .map(|(id, (at, unavailable))| {
                    (
                        id,
                        BoundaryMetrics {
                            patched_us: since(at),
                            unavailable,
                        },
                    )
                })
                .collect(),
            total_duration_us: start.elapsed().as_micros() as u64,
            status_code,
        }
    }
}

impl RequestMetrics {
    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let ms = |us: u64| us as f64 / 1000.0;
        let mut lines = vec![format!("Request: {}", self.request_id)];

        if let Some(ttc) = self.time_to_critical_us {
            lines.push(format!("  Time to critical data: {}us ({:.2}ms)", ttc, ms(ttc)));
        }

        if let Some(tts) = self.time_to_shell_us {
            lines.push(format!("  Time to shell: {}us ({:.2}ms)", tts, ms(tts)));
        }

        for (id, boundary) in &self.boundaries {
            let state = if boundary.unavailable { " [unavailable]" } else { "" };
            lines.push(format!(
                "  Boundary {}: {}us ({:.2}ms){}",
                id,
                boundary.patched_us,
                ms(boundary.patched_us),
                state
            ));
        }

        lines.push(format!(
            "  Total: {}us ({:.2}ms)",
            self.total_duration_us,
            ms(self.total_duration_us)
        ));

        lines.join("\n")
    }
}
