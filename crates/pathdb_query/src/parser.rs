//! Recursive-descent parser for path-query expressions.

use crate::ast::{BinaryOp, Expr, Path, Position, Selector, Step, UnaryOp};
use crate::error::{QueryError, QueryResult};
use crate::lexer::{Lexer, Token, TokenKind};
use serde_json::Value;

/// Builds a [`Path`] from an expression string.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// Tokenizes `source` and prepares to parse it.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression cannot be tokenized.
    pub fn new(source: &str) -> QueryResult<Self> {
        Ok(Self {
            tokens: Lexer::new(source).tokenize()?,
            index: 0,
        })
    }

    /// Parses the whole input as a location path.
    ///
    /// An empty input parses to a path with no steps.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a well-formed path or has
    /// trailing tokens.
    pub fn parse_path(mut self) -> QueryResult<Path> {
        let path = self.locations()?;
        match self.peek() {
            None => Ok(path),
            Some(token) => Err(QueryError::syntax(
                token.position,
                format!("unexpected {}; expected '.', '..', '{{' or '['", describe(&token.kind)),
            )),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> QueryResult<()> {
        match self.next() {
            Some(token) if &token.kind == kind => Ok(()),
            Some(token) => Err(QueryError::syntax(
                token.position,
                format!("unexpected {}; expected {expected}", describe(&token.kind)),
            )),
            None => Err(QueryError::unexpected_end(expected)),
        }
    }

    fn locations(&mut self) -> QueryResult<Path> {
        let mut steps = Vec::new();
        loop {
            let step = match self.peek_kind() {
                Some(TokenKind::Dot) => {
                    self.index += 1;
                    Step::Child(self.selector().unwrap_or(Selector::Current))
                }
                Some(TokenKind::DotDot) => {
                    let at = self.next().map_or(0, |t| t.position);
                    match self.selector() {
                        Some(selector) => Step::Descendant(selector),
                        None => {
                            return Err(QueryError::syntax(
                                at,
                                "'..' must be followed by a name or '*'",
                            ))
                        }
                    }
                }
                Some(TokenKind::LeftBrace) => {
                    self.index += 1;
                    let expr = self.expression()?;
                    self.expect(&TokenKind::RightBrace, "'}'")?;
                    Step::Predicate(expr)
                }
                Some(TokenKind::LeftBracket) => {
                    self.index += 1;
                    Step::Position(self.position()?)
                }
                _ => break,
            };
            steps.push(step);
        }
        Ok(Path { steps })
    }

    fn selector(&mut self) -> Option<Selector> {
        let selector = match self.peek_kind()? {
            TokenKind::Identifier(name) | TokenKind::String(name) => Selector::Name(name.clone()),
            TokenKind::Star => Selector::Wildcard,
            _ => return None,
        };
        self.index += 1;
        Some(selector)
    }

    fn position(&mut self) -> QueryResult<Position> {
        let start = self.index_literal()?;
        let position = if matches!(self.peek_kind(), Some(TokenKind::Colon)) {
            self.index += 1;
            let end = self.index_literal()?;
            Position::Slice { start, end }
        } else {
            match start {
                Some(index) => Position::Index(index),
                None => {
                    return match self.peek() {
                        Some(token) => Err(QueryError::syntax(token.position, "expected an index")),
                        None => Err(QueryError::unexpected_end("an index")),
                    }
                }
            }
        };
        self.expect(&TokenKind::RightBracket, "']'")?;
        Ok(position)
    }

    fn index_literal(&mut self) -> QueryResult<Option<i64>> {
        let negative = matches!(self.peek_kind(), Some(TokenKind::Minus));
        if negative {
            self.index += 1;
        }
        match self.peek().cloned() {
            Some(Token {
                kind: TokenKind::Number(n),
                position,
            }) => {
                self.index += 1;
                if n.fract() != 0.0 || n > i64::MAX as f64 {
                    return Err(QueryError::syntax(position, "index must be an integer"));
                }
                let n = n as i64;
                Ok(Some(if negative { -n } else { n }))
            }
            Some(token) if negative => Err(QueryError::syntax(token.position, "expected a number")),
            None if negative => Err(QueryError::unexpected_end("a number")),
            _ => Ok(None),
        }
    }

    fn expression(&mut self) -> QueryResult<Expr> {
        self.or()
    }

    fn or(&mut self) -> QueryResult<Expr> {
        let mut left = self.and()?;
        while matches!(self.peek_kind(), Some(TokenKind::Or)) {
            self.index += 1;
            let right = self.and()?;
            left = Expr::Binary(Box::new(left), BinaryOp::Or, Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> QueryResult<Expr> {
        let mut left = self.comparison()?;
        while matches!(self.peek_kind(), Some(TokenKind::And)) {
            self.index += 1;
            let right = self.comparison()?;
            left = Expr::Binary(Box::new(left), BinaryOp::And, Box::new(right));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> QueryResult<Expr> {
        let mut left = self.additive()?;
        while let Some(op) = self.peek_kind().and_then(comparison_op) {
            self.index += 1;
            let right = self.additive()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn additive(&mut self) -> QueryResult<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Subtract,
                _ => break,
            };
            self.index += 1;
            let right = self.multiplicative()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> QueryResult<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Multiply,
                Some(TokenKind::Slash) => BinaryOp::Divide,
                Some(TokenKind::Percent) => BinaryOp::Remainder,
                _ => break,
            };
            self.index += 1;
            let right = self.unary()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> QueryResult<Expr> {
        let op = match self.peek_kind() {
            Some(TokenKind::Not) => UnaryOp::Not,
            Some(TokenKind::Minus) => UnaryOp::Negate,
            _ => return self.primary(),
        };
        self.index += 1;
        Ok(Expr::Unary(op, Box::new(self.unary()?)))
    }

    fn primary(&mut self) -> QueryResult<Expr> {
        let Some(token) = self.peek().cloned() else {
            return Err(QueryError::unexpected_end("a value or a path"));
        };
        match token.kind {
            TokenKind::Dot | TokenKind::DotDot => Ok(Expr::Path(self.locations()?)),
            TokenKind::Number(n) => {
                self.index += 1;
                Ok(Expr::Literal(crate::coerce::number_value(n)))
            }
            TokenKind::String(s) => {
                self.index += 1;
                Ok(Expr::Literal(Value::String(s)))
            }
            TokenKind::Identifier(word) => {
                let literal = match word.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    "null" => Value::Null,
                    _ => {
                        return Err(QueryError::syntax(
                            token.position,
                            format!("unknown word '{word}'; paths start with '.'"),
                        ))
                    }
                };
                self.index += 1;
                Ok(Expr::Literal(literal))
            }
            TokenKind::LeftParen => {
                self.index += 1;
                let inner = self.expression()?;
                self.expect(&TokenKind::RightParen, "')'")?;
                Ok(inner)
            }
            other => Err(QueryError::syntax(
                token.position,
                format!("unexpected {}; expected a value or a path", describe(&other)),
            )),
        }
    }
}

fn comparison_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Equal => BinaryOp::Equal,
        TokenKind::StrictEqual => BinaryOp::StrictEqual,
        TokenKind::NotEqual => BinaryOp::NotEqual,
        TokenKind::StrictNotEqual => BinaryOp::StrictNotEqual,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEq => BinaryOp::GreaterEq,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEq => BinaryOp::LessEq,
        TokenKind::StartsWith => BinaryOp::StartsWith { strict: false },
        TokenKind::StrictStartsWith => BinaryOp::StartsWith { strict: true },
        TokenKind::EndsWith => BinaryOp::EndsWith { strict: false },
        TokenKind::StrictEndsWith => BinaryOp::EndsWith { strict: true },
        TokenKind::Contains => BinaryOp::Contains { strict: false },
        TokenKind::StrictContains => BinaryOp::Contains { strict: true },
        _ => return None,
    })
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Identifier(name) => format!("name '{name}'"),
        TokenKind::String(s) => format!("string \"{s}\""),
        TokenKind::Number(n) => format!("number {n}"),
        other => format!("{other:?}"),
    }
}
