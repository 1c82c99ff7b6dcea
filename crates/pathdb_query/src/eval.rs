//! Evaluation of compiled paths against JSON documents.

use crate::ast::{BinaryOp, Expr, Path, Position, Selector, Step, UnaryOp};
use crate::coerce::{compare, loose_equal, number_value, strict_equal, to_number, to_text, truthy};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

/// A position in the document being walked.
///
/// The root of a document tree is a bare map rather than a `Value`, so it
/// gets its own variant instead of being cloned into one.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Node<'a> {
    Root(&'a Map<String, Value>),
    Item(&'a Value),
}

impl<'a> Node<'a> {
    fn object(self) -> Option<&'a Map<String, Value>> {
        match self {
            Node::Root(map) | Node::Item(Value::Object(map)) => Some(map),
            Node::Item(_) => None,
        }
    }

    fn value(self) -> Cow<'a, Value> {
        match self {
            Node::Root(map) => Cow::Owned(Value::Object(map.clone())),
            Node::Item(value) => Cow::Borrowed(value),
        }
    }

    pub(crate) fn into_value(self) -> Value {
        self.value().into_owned()
    }
}

/// Result of evaluating a predicate sub-expression.
enum Operand<'a> {
    Nodes(Vec<Node<'a>>),
    Scalar(Value),
}

impl<'a> Operand<'a> {
    fn is_truthy(&self) -> bool {
        match self {
            Operand::Nodes(nodes) => !nodes.is_empty(),
            Operand::Scalar(value) => truthy(value),
        }
    }

    fn items(&self) -> Vec<Cow<'_, Value>> {
        match self {
            Operand::Nodes(nodes) => nodes.iter().map(|n| n.value()).collect(),
            Operand::Scalar(value) => vec![Cow::Borrowed(value)],
        }
    }

    /// Arithmetic sees the first selected value of a path.
    fn scalar(&self) -> Value {
        match self {
            Operand::Nodes(nodes) => nodes.first().map_or(Value::Null, |n| n.into_value()),
            Operand::Scalar(value) => value.clone(),
        }
    }
}

pub(crate) fn select<'a>(path: &Path, start: Vec<Node<'a>>) -> Vec<Node<'a>> {
    path.steps
        .iter()
        .fold(start, |nodes, step| apply_step(step, nodes))
}

fn apply_step<'a>(step: &Step, nodes: Vec<Node<'a>>) -> Vec<Node<'a>> {
    match step {
        Step::Child(Selector::Current) => nodes,
        Step::Child(selector) => {
            let mut out = Vec::new();
            for node in nodes {
                children(node, selector, &mut out);
            }
            out
        }
        Step::Descendant(selector) => {
            let mut out = Vec::new();
            for node in nodes {
                descendants(node, selector, &mut out);
            }
            out
        }
        Step::Predicate(expr) => nodes
            .into_iter()
            .filter(|node| evaluate(expr, *node).is_truthy())
            .collect(),
        Step::Position(position) => positioned(nodes, *position),
    }
}

fn push_flattened<'a>(value: &'a Value, out: &mut Vec<Node<'a>>) {
    match value {
        Value::Array(items) => out.extend(items.iter().map(Node::Item)),
        other => out.push(Node::Item(other)),
    }
}

fn children<'a>(node: Node<'a>, selector: &Selector, out: &mut Vec<Node<'a>>) {
    if let Node::Item(Value::Array(items)) = node {
        for item in items {
            children(Node::Item(item), selector, out);
        }
        return;
    }
    let Some(map) = node.object() else {
        return;
    };
    match selector {
        Selector::Name(name) => {
            if let Some(value) = map.get(name) {
                push_flattened(value, out);
            }
        }
        Selector::Wildcard => map.values().for_each(|value| push_flattened(value, out)),
        Selector::Current => out.push(node),
    }
}

fn descendants<'a>(node: Node<'a>, selector: &Selector, out: &mut Vec<Node<'a>>) {
    match node {
        Node::Item(Value::Array(items)) => {
            for item in items {
                descendants(Node::Item(item), selector, out);
            }
        }
        _ => {
            let Some(map) = node.object() else {
                return;
            };
            for (key, value) in map {
                let matched = match selector {
                    Selector::Name(name) => name == key,
                    Selector::Wildcard | Selector::Current => true,
                };
                if matched {
                    push_flattened(value, out);
                }
                descendants(Node::Item(value), selector, out);
            }
        }
    }
}

fn positioned(nodes: Vec<Node<'_>>, position: Position) -> Vec<Node<'_>> {
    let len = nodes.len() as i64;
    let resolve = |i: i64| if i < 0 { (len + i).max(0) } else { i.min(len) };
    match position {
        Position::Index(i) => {
            let index = if i < 0 { len + i } else { i };
            if (0..len).contains(&index) {
                vec![nodes[index as usize]]
            } else {
                Vec::new()
            }
        }
        Position::Slice { start, end } => {
            let from = resolve(start.unwrap_or(0));
            let to = resolve(end.unwrap_or(len));
            if from >= to {
                Vec::new()
            } else {
                nodes[from as usize..to as usize].to_vec()
            }
        }
    }
}

fn evaluate<'a>(expr: &Expr, context: Node<'a>) -> Operand<'a> {
    match expr {
        Expr::Literal(value) => Operand::Scalar(value.clone()),
        Expr::Path(path) => Operand::Nodes(select(path, vec![context])),
        Expr::Unary(UnaryOp::Not, inner) => {
            Operand::Scalar(Value::Bool(!evaluate(inner, context).is_truthy()))
        }
        Expr::Unary(UnaryOp::Negate, inner) => {
            let value = evaluate(inner, context).scalar();
            Operand::Scalar(number_value(-to_number(&value)))
        }
        Expr::Binary(left, BinaryOp::And, right) => Operand::Scalar(Value::Bool(
            evaluate(left, context).is_truthy() && evaluate(right, context).is_truthy(),
        )),
        Expr::Binary(left, BinaryOp::Or, right) => Operand::Scalar(Value::Bool(
            evaluate(left, context).is_truthy() || evaluate(right, context).is_truthy(),
        )),
        Expr::Binary(left, op, right) if op.is_comparison() => {
            let left = evaluate(left, context);
            let right = evaluate(right, context);
            Operand::Scalar(Value::Bool(any_pair(&left, &right, *op)))
        }
        Expr::Binary(left, op, right) => {
            let left = evaluate(left, context).scalar();
            let right = evaluate(right, context).scalar();
            Operand::Scalar(arithmetic(&left, *op, &right))
        }
    }
}

fn any_pair(left: &Operand<'_>, right: &Operand<'_>, op: BinaryOp) -> bool {
    let rights = right.items();
    left.items()
        .iter()
        .any(|l| rights.iter().any(|r| compare_values(l, op, r)))
}

fn compare_values(left: &Value, op: BinaryOp, right: &Value) -> bool {
    match op {
        BinaryOp::Equal => loose_equal(left, right),
        BinaryOp::StrictEqual => strict_equal(left, right),
        BinaryOp::NotEqual => !loose_equal(left, right),
        BinaryOp::StrictNotEqual => !strict_equal(left, right),
        BinaryOp::Greater => compare(left, right) == Some(Ordering::Greater),
        BinaryOp::GreaterEq => matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        BinaryOp::Less => compare(left, right) == Some(Ordering::Less),
        BinaryOp::LessEq => matches!(compare(left, right), Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::StartsWith { strict } => text_match(left, right, strict, |a, b| a.starts_with(b)),
        BinaryOp::EndsWith { strict } => text_match(left, right, strict, |a, b| a.ends_with(b)),
        BinaryOp::Contains { strict } => text_match(left, right, strict, |a, b| a.contains(b)),
        _ => false,
    }
}

fn text_match(left: &Value, right: &Value, strict: bool, test: fn(&str, &str) -> bool) -> bool {
    let (Some(haystack), Some(needle)) = (to_text(left), to_text(right)) else {
        return false;
    };
    if strict {
        test(&haystack, &needle)
    } else {
        test(&haystack.to_lowercase(), &needle.to_lowercase())
    }
}

fn arithmetic(left: &Value, op: BinaryOp, right: &Value) -> Value {
    if op == BinaryOp::Add && (left.is_string() || right.is_string()) {
        let (Some(a), Some(b)) = (to_text(left), to_text(right)) else {
            return Value::Null;
        };
        return Value::String(a + &b);
    }
    let (a, b) = (to_number(left), to_number(right));
    let n = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        BinaryOp::Remainder => a % b,
        _ => f64::NAN,
    };
    number_value(n)
}
