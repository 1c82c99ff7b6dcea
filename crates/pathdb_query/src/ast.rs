//! Syntax tree for compiled path-query expressions.

use serde_json::Value;

/// A compiled location path: a sequence of steps applied left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    /// Steps in application order.
    pub steps: Vec<Step>,
}

/// One step of a location path.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `.selector` - direct children of each item.
    Child(Selector),
    /// `..selector` - matching descendants of each item at any depth.
    Descendant(Selector),
    /// `{expr}` - keep items for which the expression is truthy.
    Predicate(Expr),
    /// `[..]` - select by position within the whole current set.
    Position(Position),
}

/// What a child or descendant step selects.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// A named property.
    Name(String),
    /// Every property.
    Wildcard,
    /// The item itself (a bare `.`).
    Current,
}

/// Positional filter over the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// A single index; negative counts from the end.
    Index(i64),
    /// A half-open range; negative bounds count from the end.
    Slice {
        /// Inclusive start, defaults to 0.
        start: Option<i64>,
        /// Exclusive end, defaults to the set length.
        end: Option<i64>,
    },
}

/// Predicate expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A string, number, boolean or null literal.
    Literal(Value),
    /// A path relative to the tested item.
    Path(Path),
    /// A prefix operator.
    Unary(UnaryOp, Box<Expr>),
    /// An infix operator.
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Negate,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Equal,
    /// `===`
    StrictEqual,
    /// `!=`
    NotEqual,
    /// `!==`
    StrictNotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `^=` / `^==`
    StartsWith {
        /// Case-sensitive form.
        strict: bool,
    },
    /// `$=` / `$==`
    EndsWith {
        /// Case-sensitive form.
        strict: bool,
    },
    /// `*=` / `*==`
    Contains {
        /// Case-sensitive form.
        strict: bool,
    },
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Remainder,
}

impl BinaryOp {
    /// Returns true for operators that compare two operands.
    #[must_use]
    pub fn is_comparison(self) -> bool {
        !matches!(
            self,
            Self::Or
                | Self::And
                | Self::Add
                | Self::Subtract
                | Self::Multiply
                | Self::Divide
                | Self::Remainder
        )
    }
}
