//! Database configuration.

/// Default table for operational log messages.
pub const DEFAULT_LOG_TABLE: &str = "log";

/// Default table for recovered errors.
pub const DEFAULT_ERROR_TABLE: &str = "_internal";

/// Configuration for opening a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Re-read the backing before every read (Live mode).
    pub no_cache: bool,

    /// Table receiving entries from [`crate::Database::log`].
    pub log_table: String,

    /// Table receiving recovered query and backing-read errors.
    pub error_table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_cache: false,
            log_table: DEFAULT_LOG_TABLE.to_string(),
            error_table: DEFAULT_ERROR_TABLE.to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether every read re-synchronizes with the backing.
    #[must_use]
    pub const fn no_cache(mut self, value: bool) -> Self {
        self.no_cache = value;
        self
    }

    /// Sets the log table name.
    #[must_use]
    pub fn log_table(mut self, name: impl Into<String>) -> Self {
        self.log_table = name.into();
        self
    }

    /// Sets the error table name.
    #[must_use]
    pub fn error_table(mut self, name: impl Into<String>) -> Self {
        self.error_table = name.into();
        self
    }
}
