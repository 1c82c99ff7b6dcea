//! Commands that change the file.

use super::CommandResult;
use pathdb_core::{Database, Filter};
use serde_json::{json, Value};

/// Parses `record` and appends it to `table`.
///
/// With `assign_id`, objects without an `id` get consecutive ids starting at
/// the table's next id. Prints what was stored.
pub fn add(db: &mut Database, table: &str, record: &str, assign_id: bool) -> CommandResult {
    let mut record: Value = serde_json::from_str(record)?;
    if assign_id {
        let mut next = db.next_id(table)?;
        let objects: Vec<&mut Value> = match &mut record {
            Value::Array(records) => records.iter_mut().collect(),
            single => vec![single],
        };
        for object in objects {
            if let Some(fields) = object.as_object_mut() {
                if !fields.contains_key("id") {
                    fields.insert("id".to_string(), json!(next));
                    next += 1;
                }
            }
        }
    }
    db.add(table, record.clone())?;
    Ok(record)
}

/// Parses `record` and replaces the records it supersedes.
pub fn replace(db: &mut Database, table: &str, record: &str, filter: Option<&str>) -> CommandResult {
    let record: Value = serde_json::from_str(record)?;
    db.replace(table, record.clone(), filter.map(Filter::expression))?;
    Ok(record)
}

/// Removes the records matched by `expression` and prints how many went.
pub fn remove(db: &mut Database, table: &str, expression: &str) -> CommandResult {
    let removed = db.remove(table, expression)?;
    Ok(json!({ "removed": removed }))
}

/// Cleans the log tables and prints what remains of the log table.
pub fn clean_logs(db: &mut Database) -> CommandResult {
    db.clean_logs()?;
    let log_table = db.config().log_table.clone();
    Ok(Value::Array(db.query(&log_table, ".")?))
}
