//! The query-delegate seam and its bundled implementation.

use crate::ast::Path;
use crate::error::QueryResult;
use crate::eval::{select, Node};
use serde_json::{Map, Value};

/// Evaluates path-query expressions against a document tree.
///
/// The table engine only depends on this trait, so a different expression
/// language can be plugged in without touching storage or CRUD logic.
pub trait QueryEngine: Send + Sync {
    /// Evaluates `expression` against `tree` and returns every match in
    /// document order.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is malformed.
    fn evaluate(&self, expression: &str, tree: &Map<String, Value>) -> QueryResult<Vec<Value>>;
}

/// The bundled path-query engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathQuery;

impl PathQuery {
    /// Creates the engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Evaluates an expression against an arbitrary JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is malformed.
    pub fn evaluate_value(&self, expression: &str, root: &Value) -> QueryResult<Vec<Value>> {
        Ok(crate::compile(expression)?.evaluate(root))
    }
}

impl QueryEngine for PathQuery {
    fn evaluate(&self, expression: &str, tree: &Map<String, Value>) -> QueryResult<Vec<Value>> {
        Ok(crate::compile(expression)?.evaluate_tree(tree))
    }
}

impl Path {
    /// Applies the path to a JSON value.
    #[must_use]
    pub fn evaluate(&self, root: &Value) -> Vec<Value> {
        collect(select(self, vec![Node::Item(root)]))
    }

    /// Applies the path to a document tree.
    #[must_use]
    pub fn evaluate_tree(&self, tree: &Map<String, Value>) -> Vec<Value> {
        collect(select(self, vec![Node::Root(tree)]))
    }
}

fn collect(nodes: Vec<Node<'_>>) -> Vec<Value> {
    nodes.into_iter().map(Node::into_value).collect()
}
