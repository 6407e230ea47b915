// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::str::Chars;

use serde::Serialize;

use crate::SdclError;

mod scanner;
mod tokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // --- structure ---
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Dot,
    LParen,
    RParen,
    DoubleLParen,
    DoubleRParen,

    // --- literals ---
    Key,
    String,
    Int,
    Float,

    // --- keywords ---
    True,
    False,
    Null,
    Date,
    Time,
    DateTime,
    Country,
    Base64,

    // --- special ---
    FrontmatterDelimiter,
    Newline,
    Comment,
    Eof,
    Illegal,
}

impl TokenKind {
    /// Keywords that introduce a typed literal (`date "2024-01-01"`).
    pub fn is_typed_literal_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Date | TokenKind::Time | TokenKind::DateTime | TokenKind::Country | TokenKind::Base64
        )
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, TokenKind::True | TokenKind::False | TokenKind::Null) || self.is_typed_literal_keyword()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::DoubleLParen => "'(('",
            TokenKind::DoubleRParen => "'))'",
            TokenKind::Key => "key",
            TokenKind::String => "string",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Date => "'date'",
            TokenKind::Time => "'time'",
            TokenKind::DateTime => "'datetime'",
            TokenKind::Country => "'country'",
            TokenKind::Base64 => "'base64'",
            TokenKind::FrontmatterDelimiter => "'---'",
            TokenKind::Newline => "newline",
            TokenKind::Comment => "comment",
            TokenKind::Eof => "end of input",
            TokenKind::Illegal => "illegal character",
        };
        f.write_str(s)
    }
}

/// Location of a token or node in the source text.
///
/// `offset` is a byte offset; `line` and `column` are 1-based, with columns
/// counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position { offset: 0, line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte range `start..end` of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Token text; a string's body without quotes, a comment's text without `#`,
    /// and `"\n"` for every newline form.
    pub literal: String,
    pub span: Span,
    pub position: Position,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    input: Chars<'a>,
    peek: Option<char>,
    offset: usize,
    line: usize,
    column: usize,
    finished: bool,
    errors: Vec<SdclError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer {
            source,
            input: source.chars(),
            peek: None,
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
            errors: Vec::new(),
        };
        lexer.peek = lexer.input.next();
        lexer
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Position of the next unread character.
    pub fn current_position(&self) -> Position {
        Position { offset: self.offset, line: self.line, column: self.column }
    }

    /// Produce the next token. Once input is exhausted every call returns `Eof`.
    pub fn next_token(&mut self) -> Token {
        tokenizer::next_token(self)
    }

    /// Lexical errors seen so far (illegal characters, unclosed strings).
    pub fn errors(&self) -> &[SdclError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<SdclError> {
        std::mem::take(&mut self.errors)
    }
}

/// Yields every token up to and including a single `Eof`.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

/// Lazily tokenize `source`.
pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}
