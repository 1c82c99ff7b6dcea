//! Structured log entries and the sinks that observe them.
//!
//! Every entry appended to a log table is also handed to a [`LogSink`], so the
//! engine never writes to a particular output stream itself.

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// One record of a log table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Table-local id, assigned with the same rule as `next_id`.
    pub id: u64,
    /// Human-readable message.
    pub msg: String,
    /// Optional structured payload (`null` when absent).
    #[serde(default)]
    pub obj: Value,
    /// UTC timestamp in ISO-8601 form, e.g. `2024-05-01T12:00:00Z`.
    pub date: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current UTC time.
    pub fn new(id: u64, msg: impl Into<String>, obj: Option<Value>) -> Self {
        Self {
            id,
            msg: msg.into(),
            obj: obj.unwrap_or(Value::Null),
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Severity an entry is emitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Ordinary operational message.
    Info,
    /// Entry written to the error table.
    Error,
}

/// Observer receiving every appended log entry.
pub trait LogSink: Send + Sync {
    /// Called after `entry` has been appended to `table`.
    fn emit(&self, level: LogLevel, table: &str, entry: &LogEntry);
}

/// Forwards entries to `tracing` (the default sink).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, level: LogLevel, table: &str, entry: &LogEntry) {
        match level {
            LogLevel::Info => tracing::info!(table, id = entry.id, obj = %entry.obj, "{}", entry.msg),
            LogLevel::Error => {
                tracing::error!(table, id = entry.id, obj = %entry.obj, "{}", entry.msg)
            }
        }
    }
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&self, _level: LogLevel, _table: &str, _entry: &LogEntry) {}
}

/// An entry captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEntry {
    /// Severity.
    pub level: LogLevel,
    /// Table the entry was appended to.
    pub table: String,
    /// The entry itself.
    pub entry: LogEntry,
}

/// Records entries in memory for inspection.
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to the database.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<EmittedEntry>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything emitted so far.
    #[must_use]
    pub fn entries(&self) -> Vec<EmittedEntry> {
        self.entries.lock().clone()
    }

    /// Forgets everything emitted so far.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, level: LogLevel, table: &str, entry: &LogEntry) {
        self.entries.lock().push(EmittedEntry {
            level,
            table: table.to_string(),
            entry: entry.clone(),
        });
    }
}
