//! Structured logging with request context.

use std::fmt;
use std::time::{Duration, Instant};

use edge_core::RequestId;
use serde_json::{Map, Value};
use tracing::Level;

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured logger with request context.
///
/// Every event carries the request ID, workload, route and the time since
/// the logger was created. Events go through `tracing`, so filtering and
/// output format are decided by the installed subscriber.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    request_id: RequestId,
    workload: Option<String>,
    route: Option<String>,
    start_time: Instant,
}

impl StructuredLogger {
    /// Create a new logger with request context.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            workload: None,
            route: None,
            start_time: Instant::now(),
        }
    }

    /// Set the workload name.
    pub fn with_workload(mut self, workload: impl Into<String>) -> Self {
        self.workload = Some(workload.into());
        self
    }

    /// Set the route path.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, Map::new());
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, Map::new());
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, Map::new());
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, Map::new());
    }

    fn log(&self, level: LogLevel, message: &str, fields: Map<String, Value>) {
        let request_id = self.request_id.as_str();
        let workload = self.workload.as_deref().unwrap_or("");
        let route = self.route.as_deref().unwrap_or("");
        let elapsed_us = self.elapsed_us();
        let fields = render_fields(fields);

        // `tracing` needs the level at the callsite.
        macro_rules! emit {
            ($level:expr) => {
                tracing::event!(
                    $level,
                    request_id,
                    workload,
                    route,
                    elapsed_us,
                    fields = %fields,
                    "{}",
                    message
                )
            };
        }

        match level {
            LogLevel::Debug => emit!(Level::DEBUG),
            LogLevel::Info => emit!(Level::INFO),
            LogLevel::Warn => emit!(Level::WARN),
            LogLevel::Error => emit!(Level::ERROR),
        }
    }

    /// Get the request ID.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Get elapsed time since logger creation.
    pub fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }
}

/// Collapse builder fields into the single `fields` value of an event.
///
/// `tracing` field names are fixed at the callsite, so per-entry keys travel
/// as one JSON object string (empty when there are none). JSON consumers
/// decode `fields` a second time to get at them.
fn render_fields(fields: Map<String, Value>) -> String {
    if fields.is_empty() {
        String::new()
    } else {
        Value::Object(fields).to_string()
    }
}

/// Builder for log entries with fluent API.
///
/// Typed fields keep their JSON type inside the event's `fields` string.
pub struct LogBuilder<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    message: String,
    fields: Map<String, Value>,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(logger: &'a StructuredLogger, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), Value::String(value.into()));
        self
    }

    /// Add an integer field.
    pub fn field_i64(mut self, key: &str, value: i64) -> Self {
        self.fields.insert(key.to_string(), Value::from(value));
        self
    }

    /// Add a boolean field.
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), Value::Bool(value));
        self
    }

    /// Add a duration field (in milliseconds).
    pub fn duration_ms(mut self, key: &str, duration: Duration) -> Self {
        self.fields
            .insert(key.to_string(), Value::from(duration.as_millis() as u64));
        self
    }

    /// Fields collected so far.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Emit the log entry.
    pub fn emit(self) {
        self.logger.log(self.level, &self.message, self.fields);
    }
}

impl StructuredLogger {
    /// Start building an info log entry.
    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, message)
    }

    /// Start building an error log entry.
    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Error, message)
    }

    /// Start building a debug log entry.
    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_context() {
        let logger = StructuredLogger::new(RequestId::from_string("req-1"))
            .with_workload("storefront-home")
            .with_route("/");
        assert_eq!(logger.request_id().as_str(), "req-1");
        // No subscriber installed: emitting is a no-op but must not panic.
        logger.info("hello");
    }

    #[test]
    fn test_builder_collects_fields() {
        let logger = StructuredLogger::new(RequestId::from_string("req-2"));
        let builder = logger
            .info_builder("Critical data loaded")
            .field("query", "FeaturedCollection")
            .field_i64("count", 4)
            .field_bool("empty", false)
            .duration_ms("took", Duration::from_millis(12));

        let fields = builder.fields();
        assert_eq!(fields["query"], "FeaturedCollection");
        assert_eq!(fields["count"], 4);
        assert_eq!(fields["empty"], false);
        assert_eq!(fields["took"], 12);
        builder.emit();
    }

    #[test]
    fn test_fields_render_as_one_json_object() {
        let logger = StructuredLogger::new(RequestId::from_string("req-3"));
        let builder = logger
            .error_builder("Streaming failed")
            .field("error", "closed")
            .field_i64("status", 502);

        let rendered = render_fields(builder.fields().clone());
        let decoded: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(decoded["error"], "closed");
        assert_eq!(decoded["status"], 502);
        assert_eq!(render_fields(Map::new()), "");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
    }
}
