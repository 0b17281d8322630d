//! Recursive-descent parser producing an [`Expression`].
//!
//! Operators are not nodes of their own: every unary and binary operator,
//! grouping parenthesis and index access is rewritten into a call of a
//! registry function. Binary operators chain strictly left to right with no
//! precedence, so `4 + 3 * 2` is `(4 + 3) * 2`.

use crate::error::ParseError;
use crate::expression::Expression;
use crate::function::Function;
use crate::lexer::Lexer;
use crate::node::Node;
use crate::registry::{self, Registry};
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenKind};
use crate::value::Value;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Function called for grouping parentheses.
pub const GROUP_FUNCTION: &str = "nil";
/// Function called for `collection[index]`.
pub const INDEX_FUNCTION: &str = "indexOf";

pub fn unary_function(operator: &str) -> Option<&'static str> {
    match operator {
        "!" => Some("not"),
        "-" => Some("negate"),
        _ => None,
    }
}

pub fn binary_function(operator: &str) -> Option<&'static str> {
    Some(match operator {
        "+" => "addOrConcat",
        "-" => "subtract",
        "*" => "multiply",
        "/" => "divide",
        "^" => "pow",
        "%" => "mod",
        "==" => "equals",
        "!=" => "notEquals",
        ">" => "greaterThan",
        ">=" => "greaterThanEqual",
        "<" => "lessThan",
        "<=" => "lessThanEqual",
        "&&" => "and",
        "||" => "or",
        _ => return None,
    })
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Token>,
    registry: Option<&'a Registry>,
    /// Open parentheses and index brackets, innermost last: what they
    /// belong to and where.
    open: Vec<(String, usize)>,
    last_offset: usize,
}

impl<'a> Parser<'a> {
    /// A parser resolving functions against the process-wide registry,
    /// unless [`Parser::with_registry`] picks another.
    pub fn new(source: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            lookahead: VecDeque::new(),
            registry: None,
            open: Vec::new(),
            last_offset: 0,
        }
    }

    pub fn with_registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn parse(mut self) -> Result<Expression, ParseError> {
        if self.peek_kind()? == TokenKind::Eof {
            return Err(ParseError::EmptyExpression);
        }
        let root = self.parse_expression()?;
        let token = self.next()?;
        if !token.is(TokenKind::Eof) {
            return Err(self.unexpected(token));
        }
        debug!(expression = %root, "parsed expression");
        Ok(Expression::new(root))
    }

    // ---- Lookahead

    fn fill(&mut self, k: usize) {
        while self.lookahead.len() <= k {
            match self.lexer.next_token() {
                Some(token) if token.is(TokenKind::Whitespace) => {
                    self.last_offset = token.start + token.text.chars().count();
                }
                Some(token) => {
                    self.last_offset = token.start;
                    self.lookahead.push_back(token);
                }
                None => {
                    let eof = Token::new(TokenKind::Eof, self.last_offset, "");
                    self.lookahead.push_back(eof);
                }
            }
        }
    }

    /// Kind of the `k`-th upcoming non-whitespace token, without consuming.
    fn peek_at(&mut self, k: usize) -> Result<TokenKind, ParseError> {
        self.fill(k);
        for token in self.lookahead.iter().take(k + 1) {
            if let Some(e) = &token.error {
                return Err(ParseError::Lex(e.clone()));
            }
        }
        Ok(self.lookahead[k].kind)
    }

    fn peek_kind(&mut self) -> Result<TokenKind, ParseError> {
        self.peek_at(0)
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        self.peek_at(0)?;
        Ok(self
            .lookahead
            .pop_front()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, self.last_offset, "")))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.next()?;
        if token.is(kind) {
            Ok(token)
        } else {
            Err(self.unexpected(token))
        }
    }

    fn unexpected(&self, token: Token) -> ParseError {
        if token.is(TokenKind::Eof) {
            if let Some((name, offset)) = self.open.last() {
                return ParseError::UnclosedParenthesis {
                    name: name.clone(),
                    offset: *offset,
                };
            }
        }
        ParseError::UnexpectedToken {
            kind: token.kind,
            text: token.text,
            offset: token.start,
        }
    }

    fn function(&self, name: &str, offset: usize) -> Result<Function, ParseError> {
        self.registry
            .unwrap_or_else(|| registry::global())
            .resolve(name)
            .map_err(|_| ParseError::UnknownFunction {
                name: name.to_string(),
                offset,
            })
    }

    // ---- Grammar

    /// An operand followed by any number of binary operators, folded left.
    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        ensure_sufficient_stack(|| self.parse_expression_inner())
    }

    fn parse_expression_inner(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_operand()?;
        while self.peek_kind()? == TokenKind::BinaryOperator {
            let operator = self.next()?;
            let name = binary_function(&operator.text).ok_or_else(|| {
                ParseError::UnrecognizedOperator {
                    operator: operator.text.clone(),
                    offset: operator.start,
                }
            })?;
            let function = self.function(name, operator.start)?;
            let right = self.parse_operand()?;
            trace!(operator = %operator.text, function = name, "functionalized");
            node = Node::call(function, vec![node, right]);
        }
        Ok(node)
    }

    /// A prefix-operator application or a primary with its postfix chain.
    fn parse_operand(&mut self) -> Result<Node, ParseError> {
        ensure_sufficient_stack(|| self.parse_operand_inner())
    }

    fn parse_operand_inner(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind()? {
            TokenKind::UnaryOperator | TokenKind::BinaryOperator => {
                let operator = self.next()?;
                let Some(name) = unary_function(&operator.text) else {
                    return Err(self.unexpected(operator));
                };
                let function = self.function(name, operator.start)?;
                let operand = self.parse_operand()?;
                Ok(Node::call(function, vec![operand]))
            }
            _ => {
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let token = self.next()?;
        let invalid = |token: &Token| ParseError::InvalidLiteral {
            text: token.text.clone(),
            offset: token.start,
        };
        let node = match token.kind {
            TokenKind::Int => Node::Literal(Value::I64(
                token.text.parse().map_err(|_| invalid(&token))?,
            )),
            TokenKind::Float => Node::Literal(Value::F64(
                token.text.parse().map_err(|_| invalid(&token))?,
            )),
            TokenKind::Bool => Node::Literal(Value::Bool(token.text == "true")),
            TokenKind::String => Node::Literal(Value::String(token.text)),
            TokenKind::AllValues => Node::property(""),
            TokenKind::ParenOpen => {
                let function = self.function(GROUP_FUNCTION, token.start)?;
                self.open.push(("(".to_string(), token.start));
                let inner = self.parse_expression()?;
                self.expect(TokenKind::ParenClose)?;
                self.open.pop();
                Node::call(function, vec![inner])
            }
            TokenKind::Identifier => self.parse_member(None, token)?,
            _ => return Err(self.unexpected(token)),
        };
        trace!(node = %node, "parsed primary");
        Ok(node)
    }

    /// `.member` and `[index]` suffixes.
    fn parse_postfix(&mut self, mut node: Node) -> Result<Node, ParseError> {
        loop {
            match self.peek_kind()? {
                TokenKind::Separator => {
                    self.next()?;
                    let name = self.expect(TokenKind::Identifier)?;
                    node = self.parse_member(Some(node), name)?;
                }
                TokenKind::IndexOpen => {
                    let open = self.next()?;
                    let function = self.function(INDEX_FUNCTION, open.start)?;
                    self.open.push(("[".to_string(), open.start));
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::IndexClose)?;
                    self.open.pop();
                    node = Node::call(function, vec![node, index]);
                }
                _ => return Ok(node),
            }
        }
    }

    /// An identifier: a property, a function call or, with a parent, a
    /// method call.
    fn parse_member(&mut self, parent: Option<Node>, name: Token) -> Result<Node, ParseError> {
        if self.peek_kind()? != TokenKind::ParenOpen {
            return Ok(Node::Property {
                name: name.text,
                parent: parent.map(Box::new),
            });
        }
        match parent {
            None => {
                let function = self.function(&name.text, name.start)?;
                let arguments = self.parse_arguments(&name)?;
                let result_index = self.parse_result_index()?;
                Ok(Node::FunctionCall {
                    function,
                    arguments,
                    result_index,
                })
            }
            Some(parent) => {
                let arguments = self.parse_arguments(&name)?;
                let result_index = self.parse_result_index()?;
                Ok(Node::MethodCall {
                    method: name.text,
                    parent: Box::new(parent),
                    arguments,
                    result_index,
                })
            }
        }
    }

    fn parse_arguments(&mut self, name: &Token) -> Result<Vec<Node>, ParseError> {
        self.expect(TokenKind::ParenOpen)?;
        self.open.push((name.text.clone(), name.start));
        let mut arguments = Vec::new();
        if self.peek_kind()? == TokenKind::ParenClose {
            self.next()?;
        } else {
            loop {
                arguments.push(self.parse_expression()?);
                let token = self.next()?;
                match token.kind {
                    TokenKind::Delimiter => continue,
                    TokenKind::ParenClose => break,
                    _ => return Err(self.unexpected(token)),
                }
            }
        }
        self.open.pop();
        Ok(arguments)
    }

    fn parse_result_index(&mut self) -> Result<usize, ParseError> {
        if self.peek_kind()? != TokenKind::ResultIndexOpen {
            return Ok(0);
        }
        self.next()?;
        let token = self.expect(TokenKind::Int)?;
        let index = token.text.parse().map_err(|_| ParseError::InvalidLiteral {
            text: token.text.clone(),
            offset: token.start,
        })?;
        self.expect(TokenKind::ResultIndexClose)?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexError;
    use once_cell::sync::Lazy;
    use pretty_assertions::assert_eq;

    static BUILTINS: Lazy<Registry> = Lazy::new(Registry::with_builtins);

    fn parse(src: &str) -> Result<Expression, ParseError> {
        Parser::new(src).with_registry(&BUILTINS).parse()
    }

    fn render(src: &str) -> String {
        match parse(src) {
            Ok(e) => e.to_string(),
            Err(e) => format!("error: {e}"),
        }
    }

    #[test]
    fn test_left_to_right_without_precedence() {
        assert_eq!(render("4 + 3 * 2"), "multiply(addOrConcat(4, 3), 2)");
        assert_eq!(render("a == b && c"), "and(equals(a, b), c)");
    }

    #[test]
    fn test_unary_binds_to_operand() {
        assert_eq!(render("-a + b"), "addOrConcat(negate(a), b)");
        assert_eq!(render("!!a"), "not(not(a))");
    }

    #[test]
    fn test_grouping_calls_nil() {
        assert_eq!(render("4 + (3 * 2)"), "addOrConcat(4, nil(multiply(3, 2)))");
    }

    #[test]
    fn test_members_and_indexing() {
        assert_eq!(
            render("lib.GetBooks(){1}[0].Title"),
            "indexOf(lib.GetBooks(){1}, 0).Title"
        );
        assert_eq!(render("a.b.c"), "a.b.c");
        assert_eq!(render("#"), "#");
    }

    #[test]
    fn test_index_is_sugar_for_index_of() {
        assert_eq!(parse("c[5]"), parse("indexOf(c, 5)"));
        assert_eq!(parse("a.b[x].c"), parse("indexOf(a.b, x).c"));
    }

    #[test]
    fn test_functions_from_other_registries_differ() {
        let other = Registry::with_builtins();
        let local = Parser::new("c[5]").with_registry(&other).parse();
        assert_ne!(parse("c[5]"), local);
    }

    #[test]
    fn test_explicit_zero_result_index() {
        assert_eq!(
            parse(r#"concat("a","b"){0}.child"#),
            parse(r#"concat("a","b").child"#)
        );
    }

    #[test]
    fn test_method_call_is_not_resolved() {
        let e = parse("x.doesNotExist(1, 2)").unwrap();
        assert!(matches!(
            e.root(),
            Node::MethodCall { method, arguments, .. } if method == "doesNotExist" && arguments.len() == 2
        ));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(""), Err(ParseError::EmptyExpression));
        assert_eq!(parse("   "), Err(ParseError::EmptyExpression));
        assert_eq!(
            parse("nope(1)"),
            Err(ParseError::UnknownFunction {
                name: "nope".to_string(),
                offset: 0
            })
        );
        assert_eq!(
            parse("concat(1, 2"),
            Err(ParseError::UnclosedParenthesis {
                name: "concat".to_string(),
                offset: 0
            })
        );
        assert_eq!(
            parse("(1 + 2"),
            Err(ParseError::UnclosedParenthesis {
                name: "(".to_string(),
                offset: 0
            })
        );
        assert_eq!(
            parse("concat(a[1"),
            Err(ParseError::UnclosedParenthesis {
                name: "[".to_string(),
                offset: 8
            })
        );
        assert_eq!(
            parse("concat(a[1], b"),
            Err(ParseError::UnclosedParenthesis {
                name: "concat".to_string(),
                offset: 0
            })
        );
        assert_eq!(
            parse("a = b"),
            Err(ParseError::UnrecognizedOperator {
                operator: "=".to_string(),
                offset: 2
            })
        );
        assert_eq!(
            parse("a b"),
            Err(ParseError::UnexpectedToken {
                kind: TokenKind::Identifier,
                text: "b".to_string(),
                offset: 2
            })
        );
        assert_eq!(
            parse("a + @"),
            Err(ParseError::Lex(LexError::UnrecognizedCharacter {
                character: '@',
                offset: 4
            }))
        );
        assert!(matches!(
            parse("99999999999999999999"),
            Err(ParseError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_empty_registry_rejects_operators() {
        let registry = Registry::new();
        assert_eq!(
            Parser::new("1 + 2").with_registry(&registry).parse(),
            Err(ParseError::UnknownFunction {
                name: "addOrConcat".to_string(),
                offset: 2
            })
        );
    }
}
