//! Lexer (tokenizer).
//!
//! A single forward pass that splits the source into tokens without
//! interpreting strings, templates, regular expressions or comments.
//! Every byte of input belongs to exactly one token, so the token texts
//! concatenate back to the original source. Deciding between a regexp and
//! a division is left to the parser, which knows whether it sits at an
//! operand position.

use crate::span::Span;
use crate::token::{keyword_from_str, operator_from_str, Token, TokenKind, MAX_OPERATOR_LEN};

/// Tokenize `source` into a vector ending with one `EndOfInput` token.
pub fn lex(source: &str) -> Vec<Token<'_>> {
    Lexer::new(source).tokenize()
}

/// The lexer state.
pub struct Lexer<'a> {
    source: &'a str,
    /// Source code as bytes (for fast indexing).
    bytes: &'a [u8],
    /// Current byte position.
    pos: usize,
    /// Start position of the current token.
    token_start: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            token_start: 0,
            line: 1,
            column: 1,
        }
    }

    /// Consume the whole input.
    pub fn tokenize(mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::with_capacity(self.bytes.len() / 2 + 1);
        while !self.is_eof() {
            tokens.push(self.next_token());
        }
        self.token_start = self.pos;
        tokens.push(self.make_token(TokenKind::EndOfInput));
        tokens
    }

    fn next_token(&mut self) -> Token<'a> {
        self.token_start = self.pos;

        let ch = self.current();
        let kind = match ch {
            // Identifiers and keywords
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.scan_identifier(),

            // Numbers
            b'0'..=b'9' => self.scan_number(),
            b'.' if self.peek_char().is_ascii_digit() => self.scan_number(),

            // Quotes; the parser gathers the literal body
            b'"' | b'\'' => {
                self.advance();
                TokenKind::StringQuote
            }
            b'`' => {
                self.advance();
                TokenKind::TemplateLiteralQuote
            }

            // Whitespace
            b' ' | b'\t' | b'\r' => {
                while matches!(self.current(), b' ' | b'\t' | b'\r') && !self.is_eof() {
                    self.advance();
                }
                TokenKind::Space
            }
            b'\n' | 0x0b | 0x0c => {
                self.advance();
                TokenKind::Newline
            }

            _ if ch.is_ascii() => self.scan_operator(),

            // Multi-byte character
            _ => {
                let width = self.source[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                self.advance_n(width);
                TokenKind::Any
            }
        };

        let token = self.make_token(kind);
        if kind == TokenKind::Newline {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += token.text.chars().count() as u32;
        }
        token
    }

    // === Helper methods ===

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn peek_char(&self) -> u8 {
        self.bytes.get(self.pos + 1).copied().unwrap_or(0)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    fn make_token(&self, kind: TokenKind) -> Token<'a> {
        Token::new(
            kind,
            &self.source[self.token_start..self.pos],
            Span::new(self.token_start as u32, self.pos as u32),
            self.line,
            self.column,
        )
    }

    fn token_slice(&self) -> &'a str {
        &self.source[self.token_start..self.pos]
    }

    // === Token scanning ===

    fn scan_identifier(&mut self) -> TokenKind {
        while matches!(
            self.current(),
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'$'
        ) {
            self.advance();
        }

        keyword_from_str(self.token_slice()).unwrap_or(TokenKind::Identifier)
    }

    fn scan_number(&mut self) -> TokenKind {
        if self.current() == b'0' {
            let radix_digit: Option<fn(u8) -> bool> = match self.peek_char() {
                b'x' | b'X' => Some(|c| c.is_ascii_hexdigit()),
                b'o' | b'O' => Some(|c| matches!(c, b'0'..=b'7')),
                b'b' | b'B' => Some(|c| matches!(c, b'0' | b'1')),
                _ => None,
            };
            if let Some(is_digit) = radix_digit {
                self.advance_n(2);
                while is_digit(self.current()) {
                    self.advance();
                }
                return TokenKind::Number;
            }
        }

        // Integer part
        while self.current().is_ascii_digit() {
            self.advance();
        }

        // Fraction; a trailing `.` belongs to the number as in `1.`
        if self.current() == b'.' {
            self.advance();
            while self.current().is_ascii_digit() {
                self.advance();
            }
        }

        // Exponent, only when digits follow
        if matches!(self.current(), b'e' | b'E') {
            let sign = usize::from(matches!(self.peek_char(), b'+' | b'-'));
            let first_digit = self.bytes.get(self.pos + 1 + sign).copied().unwrap_or(0);
            if first_digit.is_ascii_digit() {
                self.advance_n(1 + sign);
                while self.current().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        TokenKind::Number
    }

    /// Longest operator match, falling back to a single `Any` byte.
    fn scan_operator(&mut self) -> TokenKind {
        let rest = &self.bytes[self.pos..];
        for len in (1..=MAX_OPERATOR_LEN.min(rest.len())).rev() {
            let Ok(candidate) = std::str::from_utf8(&rest[..len]) else {
                continue;
            };
            if let Some(kind) = operator_from_str(candidate) {
                self.advance_n(len);
                return kind;
            }
        }
        self.advance();
        TokenKind::Any
    }
}
