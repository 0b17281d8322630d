//! Hand-written state-machine tokenizer.
//!
//! The lexer is pulled by the parser one token at a time; nothing is scanned
//! ahead of the consumer. After an `Eof` or `Error` token the stream is over.

use crate::error::LexError;
use crate::token::{Token, TokenKind};
use std::iter::Peekable;
use std::str::Chars;
use tracing::trace;

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            pos: 0,
            finished: false,
        }
    }

    /// Scans and returns the next token, or `None` once the stream has ended.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.scan();
        if matches!(token.kind, TokenKind::Eof | TokenKind::Error) {
            self.finished = true;
        }
        trace!(token = %token, "lexed");
        Some(token)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += 1;
        Some(c)
    }

    fn bump_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn consume_while(&mut self, buff: &mut String, valid: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !valid(c) {
                break;
            }
            buff.push(c);
            self.bump();
        }
    }

    fn scan(&mut self) -> Token {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, start, "");
        };
        match c {
            c if c.is_whitespace() => {
                let mut buff = String::new();
                self.consume_while(&mut buff, char::is_whitespace);
                Token::new(TokenKind::Whitespace, start, buff)
            }
            c if c.is_alphabetic() => self.scan_identifier(start),
            c if c.is_ascii_digit() => self.scan_number(start),
            '"' | '`' | '\'' => self.scan_string(start),
            _ => self.scan_symbol(start),
        }
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        let mut buff = String::new();
        self.consume_while(&mut buff, |c| c == '_' || c.is_alphanumeric());
        // Keywords are recognised after the fact, not before scanning.
        let kind = match buff.as_str() {
            "true" | "false" => TokenKind::Bool,
            _ => TokenKind::Identifier,
        };
        Token::new(kind, start, buff)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let mut buff = String::new();
        self.consume_while(&mut buff, |c| c.is_ascii_digit());
        if !self.bump_if('.') {
            return Token::new(TokenKind::Int, start, buff);
        }
        buff.push('.');
        self.consume_while(&mut buff, |c| c.is_ascii_digit());
        Token::new(TokenKind::Float, start, buff)
    }

    fn scan_string(&mut self, start: usize) -> Token {
        let Some(terminator) = self.bump() else {
            return Token::new(TokenKind::Eof, start, "");
        };
        let unterminated = LexError::UnterminatedString { offset: start };
        let mut buff = String::new();
        loop {
            match self.bump() {
                None => return Token::error(start, unterminated),
                Some(c) if c == terminator => break,
                Some('\\') => match self.bump() {
                    Some('n') => buff.push('\n'),
                    Some('t') => buff.push('\t'),
                    Some('r') => buff.push('\r'),
                    Some(c) => buff.push(c),
                    None => return Token::error(start, unterminated),
                },
                Some(c) => buff.push(c),
            }
        }
        Token::new(TokenKind::String, start, buff)
    }

    fn scan_symbol(&mut self, start: usize) -> Token {
        let Some(c) = self.bump() else {
            return Token::new(TokenKind::Eof, start, "");
        };
        let kind = match c {
            '.' => TokenKind::Separator,
            ',' => TokenKind::Delimiter,
            '(' => TokenKind::ParenOpen,
            ')' => TokenKind::ParenClose,
            '[' => TokenKind::IndexOpen,
            ']' => TokenKind::IndexClose,
            '{' => TokenKind::ResultIndexOpen,
            '}' => TokenKind::ResultIndexClose,
            '#' => TokenKind::AllValues,
            '+' | '-' | '*' | '/' | '%' | '^' => TokenKind::BinaryOperator,
            '!' => {
                if self.bump_if('=') {
                    return Token::new(TokenKind::BinaryOperator, start, "!=");
                }
                TokenKind::UnaryOperator
            }
            '=' | '<' | '>' => {
                if self.bump_if('=') {
                    return Token::new(TokenKind::BinaryOperator, start, format!("{c}="));
                }
                TokenKind::BinaryOperator
            }
            '&' | '|' => {
                if self.bump_if(c) {
                    return Token::new(TokenKind::BinaryOperator, start, format!("{c}{c}"));
                }
                // A lone `&` or `|` is left for the parser to reject.
                TokenKind::BinaryOperator
            }
            other => {
                return Token::error(
                    start,
                    LexError::UnrecognizedCharacter {
                        character: other,
                        offset: start,
                    },
                )
            }
        };
        Token::new(kind, start, c.to_string())
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .filter(|t| t.kind != Whitespace)
            .map(|t| t.kind)
            .collect()
    }

    fn texts(src: &str) -> Vec<std::string::String> {
        Lexer::new(src)
            .filter(|t| t.kind != Whitespace)
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_call_chain() {
        assert_eq!(
            kinds("lib.GetBooks(){0}[2].Title"),
            vec![
                Identifier,
                Separator,
                Identifier,
                ParenOpen,
                ParenClose,
                ResultIndexOpen,
                Int,
                ResultIndexClose,
                IndexOpen,
                Int,
                IndexClose,
                Separator,
                Identifier,
                Eof
            ]
        );
    }

    #[test]
    fn test_whitespace_is_a_token() {
        let tokens: Vec<Token> = Lexer::new("a  b").collect();
        assert_eq!(tokens[1].kind, Whitespace);
        assert_eq!(tokens[1].text, "  ");
        assert_eq!(tokens[2].start, 3);
    }

    #[test]
    fn test_bool_reclassified_after_scan() {
        assert_eq!(kinds("true false truest"), vec![Bool, Bool, Identifier, Eof]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("12 3.25 7."), vec![Int, Float, Float, Eof]);
        assert_eq!(texts("3.25"), vec!["3.25", ""]);
    }

    #[test]
    fn test_not_versus_not_equals() {
        assert_eq!(kinds("!a"), vec![UnaryOperator, Identifier, Eof]);
        assert_eq!(kinds("a != b"), vec![Identifier, BinaryOperator, Identifier, Eof]);
        assert_eq!(texts("a != b")[1], "!=");
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            texts("== >= <= && || > < ="),
            vec!["==", ">=", "<=", "&&", "||", ">", "<", "=", ""]
        );
    }

    #[test]
    fn test_string_quotes_and_escapes() {
        assert_eq!(texts(r#""a'b""#)[0], "a'b");
        assert_eq!(texts("`x\"y`")[0], "x\"y");
        assert_eq!(texts(r#"'tab\there'"#)[0], "tab\there");
        assert_eq!(texts(r#""quote\"d""#)[0], "quote\"d");
        assert_eq!(texts(r#""a\\b""#)[0], "a\\b");
    }

    #[test]
    fn test_unterminated_string() {
        let tokens: Vec<Token> = Lexer::new("\"open").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].error,
            Some(LexError::UnterminatedString { offset: 0 })
        );
    }

    #[test]
    fn test_error_ends_stream_without_eof() {
        let tokens: Vec<Token> = Lexer::new("a @ b").collect();
        assert_eq!(tokens.last().map(|t| t.kind), Some(Error));
        assert_eq!(
            tokens.last().and_then(|t| t.error.clone()),
            Some(LexError::UnrecognizedCharacter {
                character: '@',
                offset: 2
            })
        );
    }

    #[test]
    fn test_offsets_are_characters() {
        let tokens: Vec<Token> = Lexer::new("\"é\" x").collect();
        assert_eq!(tokens[2].start, 4);
    }

    #[test]
    fn test_stream_ends_after_eof() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().map(|t| t.kind), Some(Eof));
        assert_eq!(lexer.next_token(), None);
    }
}
