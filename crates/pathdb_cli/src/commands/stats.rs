//! Table statistics.

use super::CommandResult;
use pathdb_core::Database;
use serde_json::Value;

/// Prints the next free id.
pub fn next_id(db: &mut Database, table: &str) -> CommandResult {
    Ok(Value::from(db.next_id(table)?))
}

/// Prints the row count.
pub fn count(db: &mut Database, table: &str) -> CommandResult {
    Ok(Value::from(db.num_rows(table)?))
}

/// Prints the column sum.
pub fn sum(db: &mut Database, table: &str, column: &str) -> CommandResult {
    Ok(Value::from(db.sum(table, column)?))
}

/// Prints the column average; `null` for an empty table.
pub fn average(db: &mut Database, table: &str, column: &str) -> CommandResult {
    Ok(Value::from(db.average(table, column)?))
}
