//! Injected logging.
//!
//! The engine never prints on its own. Hosts hand the factory a [`LoggerSink`]
//! and every component logs through a [`PlayerLogger`] handle scoped to the
//! component's name (the factory itself, or a backend's display name such as
//! `cvlc`). The default sink discards everything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Component that produced the entry
    pub target: String,
    /// Log message
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
        }
    }
}

/// Logger sink trait
///
/// Forwards entries to whatever the host uses for logging: a console, a file,
/// journald, or a test collector. Entries below [`LoggerSink::min_level`] are
/// dropped before the sink sees them.
///
/// # Example
///
/// ```
/// use player_traits::logging::{LogEntry, LogLevel, LoggerSink};
///
/// struct StdoutSink;
///
/// impl LoggerSink for StdoutSink {
///     fn log(&self, entry: LogEntry) {
///         println!("{} {}: {}", entry.level, entry.target, entry.message);
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait LoggerSink: Send + Sync {
    /// Forward a log entry to the host logging system
    fn log(&self, entry: LogEntry);

    /// Get the minimum log level that will be processed
    ///
    /// Entries below this level are filtered out at the source.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Console logger implementation for testing/development
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    pub min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

impl LoggerSink for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level >= self.min_level {
            println!(
                "[{}] {} {}: {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                entry.level,
                entry.target,
                entry.message
            );
        }
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

/// Sink that drops every entry. Used when no logger is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl LoggerSink for NoopLogger {
    fn log(&self, _entry: LogEntry) {}

    fn min_level(&self) -> LogLevel {
        LogLevel::Error
    }
}

/// Cheap cloneable handle the engine logs through.
///
/// Cloning shares the underlying sink; [`PlayerLogger::scoped`] derives a
/// handle with a different target, which is how each backend gets entries
/// tagged with its display name.
#[derive(Clone)]
pub struct PlayerLogger {
    sink: Arc<dyn LoggerSink>,
    target: String,
}

impl PlayerLogger {
    pub fn new(sink: Arc<dyn LoggerSink>) -> Self {
        Self {
            sink,
            target: "player".to_string(),
        }
    }

    /// Handle backed by the discarding sink.
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopLogger))
    }

    /// Derive a handle that logs under a different target.
    pub fn scoped(&self, target: impl Into<String>) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.emit(LogLevel::Trace, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message);
    }

    fn emit(&self, level: LogLevel, message: impl Into<String>) {
        if level >= self.sink.min_level() {
            self.sink.log(LogEntry::new(level, self.target.clone(), message));
        }
    }
}

impl fmt::Debug for PlayerLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerLogger")
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sink that records entries for assertions.
    #[derive(Default)]
    struct CollectingSink {
        entries: Mutex<Vec<LogEntry>>,
    }

    impl LoggerSink for CollectingSink {
        fn log(&self, entry: LogEntry) {
            self.entries.lock().unwrap().push(entry);
        }

        fn min_level(&self) -> LogLevel {
            LogLevel::Trace
        }
    }

    #[test]
    fn test_log_entry_fields() {
        let entry = LogEntry::new(LogLevel::Info, "test", "Test message");

        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.target, "test");
        assert_eq!(entry.message, "Test message");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_scoped_logger_changes_target_only() {
        let sink = Arc::new(CollectingSink::default());
        let root = PlayerLogger::new(sink.clone());
        let scoped = root.scoped("omxplayer");

        root.info("from root");
        scoped.warn("from backend");

        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].target, "player");
        assert_eq!(entries[1].target, "omxplayer");
        assert_eq!(entries[1].level, LogLevel::Warn);
    }

    #[test]
    fn test_min_level_gating_happens_before_sink() {
        let mut sink = MockLoggerSink::new();
        sink.expect_min_level().return_const(LogLevel::Warn);
        // Only the error entry may reach the sink.
        sink.expect_log()
            .withf(|entry| entry.level == LogLevel::Error)
            .times(1)
            .return_const(());

        let logger = PlayerLogger::new(Arc::new(sink)).scoped("cvlc");
        logger.debug("dropped at the source");
        logger.error("kept");
    }

    #[test]
    fn test_noop_logger_discards() {
        let logger = PlayerLogger::noop();
        logger.error("nobody hears this");
    }

    #[test]
    fn test_console_logger_respects_min_level() {
        let logger = ConsoleLogger::new(LogLevel::Error);
        // Below min level: the entry is dropped inside the sink as well.
        logger.log(LogEntry::new(LogLevel::Debug, "test", "quiet"));
        assert_eq!(logger.min_level(), LogLevel::Error);
    }
}
