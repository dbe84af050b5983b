//! Logging collaborator for the interception pipeline.
//!
//! The dispatch wrappers never talk to a logging backend directly. They go
//! through [`CallLogger`], which bundles the two things the pipeline needs:
//! the "is verbose logging enabled" predicate and a sink for formatted
//! records. The default [`TracingCallLogger`] forwards records to `tracing`
//! and consults the process-wide flag in [`crate::config`];
//! [`RecordingLogger`] captures records in memory so tests can assert on
//! exactly what a call emitted.

use std::sync::{Mutex, PoisonError};

use tracing::Level;

use crate::config;

/// Decides whether per-call logging is enabled and receives the records.
pub trait CallLogger: Send + Sync {
    /// Whether verbose request/response logging is currently enabled.
    ///
    /// Consulted before every record emission; when `false`, the wrappers
    /// skip formatting entirely.
    fn verbose(&self) -> bool;

    /// Deliver one formatted record at the given severity.
    fn record(&self, level: Level, message: &str);
}

/// Default logger: forwards records to `tracing` events.
///
/// The verbose predicate is the process-wide flag set via
/// [`crate::config::set_log_requests`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCallLogger;

impl CallLogger for TracingCallLogger {
    fn verbose(&self) -> bool {
        config::should_log_requests()
    }

    fn record(&self, level: Level, message: &str) {
        if level == Level::ERROR {
            tracing::error!("{message}");
        } else if level == Level::WARN {
            tracing::warn!("{message}");
        } else if level == Level::INFO {
            tracing::info!("{message}");
        } else if level == Level::DEBUG {
            tracing::debug!("{message}");
        } else {
            tracing::trace!("{message}");
        }
    }
}

/// A single captured log record.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
}

/// In-memory logger for tests: captures every record in order.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    verbose: bool,
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    /// Create a logger with the verbose predicate fixed to `verbose`.
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all records captured so far, in emission order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The captured record messages, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }
}

impl CallLogger for RecordingLogger {
    fn verbose(&self) -> bool {
        self.verbose
    }

    fn record(&self, level: Level, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogRecord {
                level,
                message: message.to_owned(),
            });
    }
}
