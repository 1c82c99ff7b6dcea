//! Record selection for `remove` and `replace`.

use serde_json::Value;
use std::fmt;

/// Selects which records of a table an operation applies to.
///
/// # Example
///
/// ```rust
/// use pathdb_core::Filter;
///
/// let by_query: Filter<'_> = ".{.id > 1}".into();
/// let by_closure = Filter::predicate(|record| record["id"] == 1);
/// # let _ = (by_query, by_closure);
/// ```
pub enum Filter<'a> {
    /// Selects records for which the closure returns true.
    Predicate(Box<dyn Fn(&Value) -> bool + 'a>),
    /// Selects records matched by a path-query expression applied to the table.
    Expression(String),
}

impl<'a> Filter<'a> {
    /// Creates a predicate filter.
    pub fn predicate(f: impl Fn(&Value) -> bool + 'a) -> Self {
        Self::Predicate(Box::new(f))
    }

    /// Creates an expression filter.
    pub fn expression(expression: impl Into<String>) -> Self {
        Self::Expression(expression.into())
    }

    /// Selects records whose `id` field equals `id`.
    ///
    /// Numbers compare by value, so `1` and `1.0` are the same id.
    pub fn by_id(id: Value) -> Self {
        Self::predicate(move |record| record.get("id").is_some_and(|other| same_id(other, &id)))
    }
}

fn same_id(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

impl From<&str> for Filter<'_> {
    fn from(expression: &str) -> Self {
        Self::Expression(expression.to_string())
    }
}

impl From<String> for Filter<'_> {
    fn from(expression: String) -> Self {
        Self::Expression(expression)
    }
}

impl fmt::Debug for Filter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Filter::Predicate(..)"),
            Self::Expression(expression) => f.debug_tuple("Filter::Expression").field(expression).finish(),
        }
    }
}
