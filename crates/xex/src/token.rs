//! Token types produced by the [`Lexer`](crate::lexer::Lexer).

use crate::error::LexError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    Identifier,
    /// `.`
    Separator,
    /// `,`
    Delimiter,
    ParenOpen,
    ParenClose,
    /// `[`
    IndexOpen,
    /// `]`
    IndexClose,
    /// `{`
    ResultIndexOpen,
    /// `}`
    ResultIndexClose,
    BinaryOperator,
    UnaryOperator,
    String,
    Int,
    Float,
    Bool,
    /// `#`
    AllValues,
    Error,
    Eof,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Separator => "SEPARATOR",
            TokenKind::Delimiter => "DELIMITER",
            TokenKind::ParenOpen => "LEFT_PARENTHESIS",
            TokenKind::ParenClose => "RIGHT_PARENTHESIS",
            TokenKind::IndexOpen => "LEFT_INDEX",
            TokenKind::IndexClose => "RIGHT_INDEX",
            TokenKind::ResultIndexOpen => "LEFT_RESULT_INDEX",
            TokenKind::ResultIndexClose => "RIGHT_RESULT_INDEX",
            TokenKind::BinaryOperator => "BINARY_OPERATOR",
            TokenKind::UnaryOperator => "UNARY_OPERATOR",
            TokenKind::String => "STRING",
            TokenKind::Int => "INTEGER",
            TokenKind::Float => "FLOAT",
            TokenKind::Bool => "BOOL",
            TokenKind::AllValues => "ALL_VALUES",
            TokenKind::Error => "ERROR",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One lexeme. `start` is a character offset into the source; `text` holds
/// the lexeme with string quotes removed and escapes applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub text: String,
    pub error: Option<LexError>,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, text: impl Into<String>) -> Self {
        Token {
            kind,
            start,
            text: text.into(),
            error: None,
        }
    }

    pub fn error(start: usize, error: LexError) -> Self {
        Token {
            kind: TokenKind::Error,
            start,
            text: error.to_string(),
            error: Some(error),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) = {:?}",
            self.kind,
            self.start,
            self.text.chars().count(),
            self.text
        )
    }
}
