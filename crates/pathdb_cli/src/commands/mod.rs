//! CLI command implementations.
//!
//! Each command returns the JSON value `main` prints.

pub mod mutate;
pub mod query;
pub mod stats;

/// Result type shared by the commands.
pub type CommandResult = Result<serde_json::Value, Box<dyn std::error::Error>>;
