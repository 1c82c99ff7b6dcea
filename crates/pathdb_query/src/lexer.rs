//! Tokenizer for path-query expressions.

use crate::error::{QueryError, QueryResult};

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `*` (wildcard or multiplication)
    Star,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `:`
    Colon,

    /// Bare property name or keyword (`true`, `false`, `null`).
    Identifier(String),
    /// Double-quoted string.
    String(String),
    /// Numeric literal.
    Number(f64),

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
    /// `^=`
    StartsWith,
    /// `^==`
    StrictStartsWith,
    /// `$=`
    EndsWith,
    /// `$==`
    StrictEndsWith,
    /// `*=`
    Contains,
    /// `*==`
    StrictContains,

    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `/`
    Slash,
    /// `%`
    Percent,
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was read.
    pub kind: TokenKind,
    /// Byte offset in the source expression.
    pub position: usize,
}

/// Splits an expression into tokens.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            index: 0,
        }
    }

    /// Reads the whole expression.
    ///
    /// # Errors
    ///
    /// Returns an error on an unknown character, an unterminated string or a
    /// malformed number.
    pub fn tokenize(mut self) -> QueryResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.index).map(|&(_, c)| c)
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.index + ahead).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.index)
            .map_or(self.source.len(), |&(offset, _)| offset)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current();
        self.index += 1;
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(c) if c.is_whitespace()) {
            self.index += 1;
        }
    }

    fn next_token(&mut self) -> QueryResult<Option<Token>> {
        self.skip_whitespace();
        let position = self.offset();
        let Some(c) = self.current() else {
            return Ok(None);
        };

        let kind = match c {
            '.' => {
                self.advance();
                if self.current() == Some('.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            '[' => self.single(TokenKind::LeftBracket),
            ']' => self.single(TokenKind::RightBracket),
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            ':' => self.single(TokenKind::Colon),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '=' => match (self.peek(1), self.peek(2)) {
                (Some('='), Some('=')) => self.multi(3, TokenKind::StrictEqual),
                (Some('='), _) => self.multi(2, TokenKind::Equal),
                _ => return Err(QueryError::syntax(position, "expected '==' or '==='")),
            },
            '!' => match (self.peek(1), self.peek(2)) {
                (Some('='), Some('=')) => self.multi(3, TokenKind::StrictNotEqual),
                (Some('='), _) => self.multi(2, TokenKind::NotEqual),
                _ => self.single(TokenKind::Not),
            },
            '>' => self.with_eq(TokenKind::Greater, TokenKind::GreaterEq),
            '<' => self.with_eq(TokenKind::Less, TokenKind::LessEq),
            '^' => self.string_op(position, '^', TokenKind::StartsWith, TokenKind::StrictStartsWith)?,
            '$' if self.peek(1) == Some('=') => {
                self.string_op(position, '$', TokenKind::EndsWith, TokenKind::StrictEndsWith)?
            }
            '*' => match (self.peek(1), self.peek(2)) {
                (Some('='), Some('=')) => self.multi(3, TokenKind::StrictContains),
                (Some('='), _) => self.multi(2, TokenKind::Contains),
                _ => self.single(TokenKind::Star),
            },
            '&' if self.peek(1) == Some('&') => self.multi(2, TokenKind::And),
            '|' if self.peek(1) == Some('|') => self.multi(2, TokenKind::Or),
            '"' => TokenKind::String(self.read_string(position)?),
            c if c.is_ascii_digit() => TokenKind::Number(self.read_number(position)?),
            c if is_identifier_start(c) => TokenKind::Identifier(self.read_identifier()),
            other => {
                return Err(QueryError::syntax(
                    position,
                    format!("unexpected character '{other}'"),
                ))
            }
        };

        Ok(Some(Token { kind, position }))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.index += 1;
        kind
    }

    fn multi(&mut self, width: usize, kind: TokenKind) -> TokenKind {
        self.index += width;
        kind
    }

    fn with_eq(&mut self, plain: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.peek(1) == Some('=') {
            self.multi(2, with_eq)
        } else {
            self.single(plain)
        }
    }

    fn string_op(
        &mut self,
        position: usize,
        lead: char,
        loose: TokenKind,
        strict: TokenKind,
    ) -> QueryResult<TokenKind> {
        match (self.peek(1), self.peek(2)) {
            (Some('='), Some('=')) => Ok(self.multi(3, strict)),
            (Some('='), _) => Ok(self.multi(2, loose)),
            _ => Err(QueryError::syntax(
                position,
                format!("expected '{lead}=' or '{lead}=='"),
            )),
        }
    }

    fn read_string(&mut self, start: usize) -> QueryResult<String> {
        self.advance();
        let mut out = String::new();
        loop {
            let Some(c) = self.advance() else {
                return Err(QueryError::syntax(start, "unterminated string"));
            };
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let escape_at = self.offset();
                    let escaped = match self.advance() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('u') => self.read_unicode_escape(escape_at)?,
                        Some(other) => {
                            return Err(QueryError::syntax(
                                escape_at,
                                format!("unknown escape '\\{other}'"),
                            ))
                        }
                        None => return Err(QueryError::syntax(start, "unterminated string")),
                    };
                    out.push(escaped);
                }
                other => out.push(other),
            }
        }
    }

    fn read_unicode_escape(&mut self, at: usize) -> QueryResult<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .advance()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| QueryError::syntax(at, "invalid unicode escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| QueryError::syntax(at, "invalid unicode escape"))
    }

    fn read_number(&mut self, start: usize) -> QueryResult<f64> {
        let mut text = String::new();
        while let Some(c) = self.current() {
            let is_fraction_dot =
                c == '.' && !text.contains('.') && matches!(self.peek(1), Some(d) if d.is_ascii_digit());
            let is_exponent = (c == 'e' || c == 'E') && !text.contains(['e', 'E']);
            let is_exponent_sign =
                (c == '+' || c == '-') && text.ends_with(['e', 'E']);
            if c.is_ascii_digit() || is_fraction_dot || is_exponent || is_exponent_sign {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        text.parse::<f64>()
            .map_err(|_| QueryError::syntax(start, format!("invalid number '{text}'")))
    }

    fn read_identifier(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.current() {
            if is_identifier_continue(c) {
                out.push(c);
                self.advance();
            } else {
                break;
            }
        }
        out
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_simple_path() {
        assert_eq!(
            kinds(r#"."people".name"#),
            vec![
                TokenKind::Dot,
                TokenKind::String("people".into()),
                TokenKind::Dot,
                TokenKind::Identifier("name".into()),
            ]
        );
    }

    #[test]
    fn lex_descendant_and_wildcard() {
        assert_eq!(
            kinds("..id.*"),
            vec![
                TokenKind::DotDot,
                TokenKind::Identifier("id".into()),
                TokenKind::Dot,
                TokenKind::Star,
            ]
        );
    }

    #[test]
    fn lex_comparison_operators() {
        assert_eq!(
            kinds("== === != !== > >= < <= ^= ^== $= $== *= *=="),
            vec![
                TokenKind::Equal,
                TokenKind::StrictEqual,
                TokenKind::NotEqual,
                TokenKind::StrictNotEqual,
                TokenKind::Greater,
                TokenKind::GreaterEq,
                TokenKind::Less,
                TokenKind::LessEq,
                TokenKind::StartsWith,
                TokenKind::StrictStartsWith,
                TokenKind::EndsWith,
                TokenKind::StrictEndsWith,
                TokenKind::Contains,
                TokenKind::StrictContains,
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(
            kinds("1 2.5 1e3 7.x"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Number(2.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(7.0),
                TokenKind::Dot,
                TokenKind::Identifier("x".into()),
            ]
        );
    }

    #[test]
    fn lex_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\cA""#),
            vec![TokenKind::String("a\"b\\cA".into())]
        );
    }

    #[test]
    fn lex_positions() {
        let tokens = Lexer::new(".a == 1").tokenize().unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 3, 6]);
    }

    #[test]
    fn lex_unterminated_string_fails() {
        let err = Lexer::new(r#"."people"#).tokenize().unwrap_err();
        assert_eq!(err, QueryError::syntax(1, "unterminated string"));
    }

    #[test]
    fn lex_single_equals_fails() {
        assert!(Lexer::new(".a = 1").tokenize().is_err());
    }

    #[test]
    fn lex_unknown_character_fails() {
        assert!(matches!(
            Lexer::new(".a # 1").tokenize(),
            Err(QueryError::Syntax { position: 3, .. })
        ));
    }
}
