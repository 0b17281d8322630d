//! Embeddable expression language.
//!
//! # Overview
//!
//! Expressions such as `select(lib.GetBooks(), "book", book.Year > 1900)[0].Title`
//! are parsed into an immutable tree and evaluated against a caller supplied
//! [`Values`] environment. Functions come from a [`Registry`]; methods and
//! fields come from host types implementing [`Object`].
//!
//! Operators have no precedence and chain left to right: `4 + 3 * 2` is `14`.
//!
//! # Example
//!
//! ```
//! use xex::{Value, Values};
//!
//! let expr = xex::parse("concat(greeting, \", \", name) + \"!\"").unwrap();
//! let values = Values::new().with("greeting", "Hello").with("name", "world");
//!
//! assert_eq!(expr.evaluate(&values).unwrap(), Value::from("Hello, world!"));
//! ```

pub mod builtins;
pub mod error;
pub mod evaluate;
pub mod expression;
pub mod function;
pub mod json;
pub mod lexer;
pub mod node;
pub mod object;
pub mod parser;
pub mod registry;
mod stack;
pub mod token;
pub mod value;

// Re-export the core public API
pub use error::{EvalError, InvokeError, JsonError, LexError, ParseError, RegistryError};
pub use expression::Expression;
pub use function::{Arity, Documentation, Function, ParamKind, Rest, Signature};
pub use lexer::Lexer;
pub use node::Node;
pub use object::{MethodTable, Object};
pub use parser::Parser;
pub use registry::Registry;
pub use token::{Token, TokenKind};
pub use value::{MapEntry, Value, Values};

use std::io::Read;

/// Parses `source` against the process-wide registry.
pub fn parse(source: &str) -> Result<Expression, ParseError> {
    Parser::new(source).parse()
}

/// Parses `source` against `registry`.
pub fn parse_with(source: &str, registry: &Registry) -> Result<Expression, ParseError> {
    Parser::new(source).with_registry(registry).parse()
}

/// Reads all of `reader` and parses it against the process-wide registry.
pub fn parse_reader(mut reader: impl Read) -> Result<Expression, ParseError> {
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|e| LexError::Io(e.to_string()))?;
    parse(&source)
}
