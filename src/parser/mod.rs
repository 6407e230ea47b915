// Author: Dustin Pilgrim
// License: MIT

use crate::SdclError;
use crate::ast::Document;
use crate::error::Result;
use crate::lexer::{Lexer, Position, Token, TokenKind};
use crate::limits::Limits;

mod document;
mod reference;
mod value;

/// Recursive-descent parser with one token of lookahead.
///
/// The parser never stops at the first problem: errors are collected and the
/// parser skips ahead to the next statement boundary.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peek: Token,
    prev_end: usize,
    depth: usize,
    limits: Limits,
    errors: Vec<SdclError>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let peek = lexer.next_token();
        Self {
            lexer,
            peek,
            prev_end: 0,
            depth: 0,
            limits: Limits::default(),
            errors: Vec::new(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub(crate) fn bump(&mut self) -> Token {
        let next = self.lexer.next_token();
        let curr = std::mem::replace(&mut self.peek, next);
        self.prev_end = curr.span.end;
        curr
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek.kind
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    pub(crate) fn expect(&mut self, expected: TokenKind, hint: Option<&str>, code: u32) -> Result<Token> {
        if self.at(expected) {
            return Ok(self.bump());
        }
        Err(self.unexpected(&expected.to_string(), hint, code))
    }

    /// Error describing the lookahead token when something else was wanted.
    pub(crate) fn unexpected(&self, expected: &str, hint: Option<&str>, code: u32) -> SdclError {
        let tok = &self.peek;
        match tok.kind {
            TokenKind::Eof => SdclError::UnexpectedEof {
                message: format!("Expected {}", expected),
                line: tok.position.line,
                column: tok.position.column,
                hint: hint.map(Into::into),
                code: Some(201),
            },
            TokenKind::Illegal => {
                SdclError::illegal_character(tok.literal.chars().next().unwrap_or('\0'), tok.position)
            }
            found => SdclError::syntax(format!("Expected {}, found {}", expected, found), tok.position, hint, code),
        }
    }

    pub(crate) fn position(&self) -> Position {
        self.peek.position
    }

    /// Source text from byte `start` up to the end of the last consumed token.
    pub(crate) fn slice_from(&self, start: usize) -> String {
        self.lexer.source().get(start..self.prev_end).unwrap_or_default().to_string()
    }

    /// Skip newlines and comments (layout inside brackets, blank lines between statements).
    pub(crate) fn skip_layout(&mut self) {
        while matches!(self.peek.kind, TokenKind::Newline | TokenKind::Comment) {
            self.bump();
        }
    }

    pub(crate) fn enter_nesting(&mut self, at: Position) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limits.max_nesting_depth {
            return Err(SdclError::syntax(
                format!("Literals nested deeper than {} levels", self.limits.max_nesting_depth),
                at,
                Some("Flatten the structure or raise Limits::max_nesting_depth"),
                223,
            ));
        }
        Ok(())
    }

    pub(crate) fn leave_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn report(&mut self, error: SdclError) {
        self.errors.push(error);
    }

    /// Skip to the next newline that is not inside a bracket left open by the
    /// failed statement, or to end of input.
    pub(crate) fn synchronize(&mut self) {
        let mut open = std::mem::take(&mut self.depth);
        loop {
            match self.peek.kind {
                TokenKind::Eof => return,
                TokenKind::Newline if open == 0 => return,
                TokenKind::LBrace | TokenKind::LBracket => open += 1,
                TokenKind::RBrace | TokenKind::RBracket => open = open.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
    }

    pub fn parse_document(&mut self) -> Document {
        let document = document::parse_document(self);

        // illegal characters are reported by both the lexer and the parser
        for error in self.lexer.take_errors() {
            if !self.errors.contains(&error) {
                self.errors.push(error);
            }
        }
        self.errors.sort_by_key(|e| e.position());

        tracing::debug!(
            statements = document.statements.len(),
            front_matter = document.front_matter.is_some(),
            errors = self.errors.len(),
            "parsed document"
        );
        document
    }

    /// Errors collected so far, sorted by position once `parse_document` returns.
    pub fn errors(&self) -> &[SdclError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<SdclError> {
        std::mem::take(&mut self.errors)
    }
}

/// Parse `source` into a document plus every lexical and syntax error found.
pub fn parse(source: &str) -> (Document, Vec<SdclError>) {
    parse_with_limits(source, Limits::default())
}

pub fn parse_with_limits(source: &str, limits: Limits) -> (Document, Vec<SdclError>) {
    let mut parser = Parser::new(source).with_limits(limits);
    let document = parser.parse_document();
    (document, parser.take_errors())
}

#[cfg(test)]
mod tests;
