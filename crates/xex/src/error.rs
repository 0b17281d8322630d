use crate::function::{Arity, ParamKind};
use crate::token::TokenKind;
use thiserror::Error;

/// Failure while turning characters into tokens. Always terminal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unrecognized character {character:?} at position {offset}")]
    UnrecognizedCharacter { character: char, offset: usize },

    #[error("unterminated string literal starting at position {offset}")]
    UnterminatedString { offset: usize },

    #[error("error reading expression: {0}")]
    Io(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty expression")]
    EmptyExpression,

    #[error("unclosed parenthesis for {name} at position {offset}")]
    UnclosedParenthesis { name: String, offset: usize },

    #[error("function {name:?} does not exist (position {offset})")]
    UnknownFunction { name: String, offset: usize },

    #[error("unexpected token {kind} {text:?} at position {offset}")]
    UnexpectedToken {
        kind: TokenKind,
        text: String,
        offset: usize,
    },

    #[error("unrecognized operator {operator:?} at position {offset}")]
    UnrecognizedOperator { operator: String, offset: usize },

    #[error("invalid literal {text:?} at position {offset}")]
    InvalidLiteral { text: String, offset: usize },

    #[error(transparent)]
    Lex(#[from] LexError),
}

/// Failure calling a native function or method.
///
/// "Could not be called" and "was called and reported a failure" arrive
/// through the same type so callers only ever check one error channel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    #[error("expected {expected} argument(s), got {actual}")]
    Arity { expected: Arity, actual: usize },

    #[error("argument {position}: expected {expected}, got {actual}")]
    ArgumentType {
        position: usize,
        expected: ParamKind,
        actual: String,
    },

    #[error("{0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),

    #[error("method {method:?} not found on {type_name}")]
    MethodNotFound { method: String, type_name: String },

    #[error("result index {index} out of range for {len} result(s)")]
    ResultIndex { index: usize, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("no value named {0:?}")]
    MissingValue(String),

    #[error("property {property:?} not found on {type_name}")]
    MissingProperty { property: String, type_name: String },

    #[error("error calling {name}: {source}")]
    Call {
        name: String,
        #[source]
        source: InvokeError,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("attempt to register an unnamed function")]
    Unnamed,

    #[error("invalid function name {0:?}: function names must match ^[a-z][a-zA-Z0-9_]*$")]
    InvalidName(String),

    #[error("function {0:?} is already registered")]
    Duplicate(String),

    #[error("function {0:?} does not exist")]
    NotFound(String),

    #[error("a process-wide registry is already installed")]
    AlreadyInstalled,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("{0} cannot be represented as JSON")]
    Unrepresentable(String),
}
