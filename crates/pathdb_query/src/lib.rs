//! # pathdb Query
//!
//! Path-query expression language for pathdb.
//!
//! An expression is a chain of locations walked from the document root:
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `.name`, `."quoted name"` | child property (arrays are flattened into the result) |
//! | `.*` | every property value |
//! | `..name` | `name` at any depth |
//! | `.` (nothing after) | the current set, unchanged |
//! | `{expr}` | keep items for which `expr` is truthy |
//! | `[n]`, `[-n]`, `[a:b]` | position within the current set |
//!
//! Predicates support `==` (loose), `===`, `!=`, `!==`, `>`, `>=`, `<`, `<=`,
//! `^=` (starts with), `$=` (ends with), `*=` (contains), their
//! case-sensitive `^==`/`$==`/`*==` forms, `&&`, `||`, `!`, arithmetic and
//! parentheses. A path inside a predicate is relative to the tested item and
//! compares existentially: it matches if any value it selects matches.
//!
//! ## Example
//!
//! ```rust
//! use pathdb_query::{PathQuery, QueryEngine};
//! use serde_json::{json, Map, Value};
//!
//! let mut tree = Map::new();
//! tree.insert("people".into(), json!([
//!     { "id": 1, "name": "george", "age": 24 },
//!     { "id": 2, "name": "judy", "age": 75 },
//! ]));
//!
//! let found = PathQuery::new()
//!     .evaluate(r#"."people"{.age > 38}.name"#, &tree)
//!     .unwrap();
//! assert_eq!(found, vec![Value::from("judy")]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod ast;
mod coerce;
mod engine;
mod error;
mod eval;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, Path, Position, Selector, Step, UnaryOp};
pub use engine::{PathQuery, QueryEngine};
pub use error::{QueryError, QueryResult};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

/// Parses an expression into a reusable [`Path`].
///
/// # Errors
///
/// Returns an error if the expression is malformed.
pub fn compile(expression: &str) -> QueryResult<Path> {
    Parser::new(expression)?.parse_path()
}
