//! Query and listing commands.

use super::CommandResult;
use pathdb_core::Database;
use serde_json::Value;

/// Runs the query command.
///
/// With `one`, prints the first match or `{}`.
pub fn run(db: &mut Database, table: &str, expression: &str, one: bool) -> CommandResult {
    if one {
        Ok(db.query_one(table, expression)?)
    } else {
        Ok(Value::Array(db.query(table, expression)?))
    }
}

/// Lists table names.
pub fn tables(db: &mut Database) -> Value {
    Value::from(db.table_names())
}
