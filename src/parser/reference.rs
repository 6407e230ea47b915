// Author: Dustin Pilgrim
// License: MIT

use super::*;
use crate::ast::{Expression, Identifier, PathSegment, Reference};

/// `(a.b.c)`
pub(super) fn parse_value_reference(parser: &mut Parser) -> Result<Expression> {
    let open = parser.bump(); // consume (
    let path = parse_path(parser)?;
    let hint = if parser.at(TokenKind::DoubleRParen) {
        "'))' closes a content inclusion; close a value reference with ')'"
    } else {
        "Close the value reference with ')'"
    };
    parser.expect(TokenKind::RParen, Some(hint), 225)?;
    Ok(Expression::ValueReference(Reference { path, position: open.position }))
}

/// `((a.b.c))`
pub(super) fn parse_content_inclusion(parser: &mut Parser) -> Result<Expression> {
    let open = parser.bump(); // consume ((
    let path = parse_path(parser)?;
    parser.expect(TokenKind::DoubleRParen, Some("Close the content inclusion with '))'"), 226)?;
    Ok(Expression::ContentInclusion(Reference { path, position: open.position }))
}

/// `.doc.a.b`, where `doc` names another document.
pub(super) fn parse_external_reference(parser: &mut Parser) -> Result<Expression> {
    let dot = parser.bump(); // consume .
    let path = parse_path(parser)?;
    Ok(Expression::ExternalReference(Reference { path, position: dot.position }))
}

fn parse_path(parser: &mut Parser) -> Result<Vec<PathSegment>> {
    let mut path = Vec::new();
    parse_segment(parser, &mut path)?;

    // Handle dot notation for nested references
    while parser.at(TokenKind::Dot) {
        parser.bump(); // consume dot
        parse_segment(parser, &mut path)?;
    }

    Ok(path)
}

fn parse_segment(parser: &mut Parser, path: &mut Vec<PathSegment>) -> Result<()> {
    let kind = parser.peek_kind();
    if kind == TokenKind::Key || kind.is_keyword() {
        let tok = parser.bump();
        path.push(PathSegment::Key(Identifier { name: tok.literal, position: tok.position }));
        return Ok(());
    }
    if kind == TokenKind::Int {
        let tok = parser.bump();
        path.push(PathSegment::Index { value: tok.literal, position: tok.position });
        return Ok(());
    }
    // `a.0.1` lexes its last two segments as the float `0.1`
    if kind == TokenKind::Float {
        let tok = parser.bump();
        if let Some((first, second)) = tok.literal.split_once('.') {
            let at = tok.position;
            let width = first.chars().count() + 1;
            let second_at = Position { offset: at.offset + first.len() + 1, line: at.line, column: at.column + width };
            path.push(PathSegment::Index { value: first.to_string(), position: at });
            path.push(PathSegment::Index { value: second.to_string(), position: second_at });
            return Ok(());
        }
    }
    Err(parser.unexpected("key in reference path", Some("Paths are dot-separated keys, e.g. (server.host)"), 224))
}
