//! The persisted document tree and its JSON text form.

use crate::error::{BackingError, BackingResult};
use serde_json::{Map, Value};

/// Mapping from table name to that table's records.
///
/// Every value is expected to be a JSON array of records. The tree is always
/// persisted as one JSON object.
pub type DocumentTree = Map<String, Value>;

/// Parses stored JSON text into a document tree.
///
/// Blank text and the JSON literal `null` decode to `None`.
///
/// # Errors
///
/// Returns an error if the text is not JSON or its root is not an object.
pub fn decode_tree(text: &str) -> BackingResult<Option<DocumentTree>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(text)? {
        Value::Null => Ok(None),
        Value::Object(tree) => Ok(Some(tree)),
        other => Err(BackingError::invalid_document(format!(
            "expected a JSON object at the root, found {}",
            kind_of(&other)
        ))),
    }
}

/// Serializes a document tree to compact JSON text.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_tree(tree: &DocumentTree) -> BackingResult<String> {
    Ok(serde_json::to_string(tree)?)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
