use std::collections::HashSet;

use super::*;
use crate::ast::{ExpressionStatement, FrontMatter, KeyValuePair, Statement};

pub(super) fn parse_document(parser: &mut Parser) -> Document {
    parser.skip_layout();

    let front_matter = if parser.at(TokenKind::FrontmatterDelimiter) {
        Some(parse_front_matter(parser))
    } else {
        None
    };

    // front matter and body share one key space
    let mut keys: HashSet<String> = front_matter
        .iter()
        .flat_map(|fm| fm.pairs.iter().map(|kv| kv.key.name.clone()))
        .collect();
    let mut statements = Vec::new();

    loop {
        match parser.peek_kind() {
            TokenKind::Newline | TokenKind::Comment => {
                parser.bump();
            }
            TokenKind::Eof => break,
            TokenKind::FrontmatterDelimiter => {
                let err = SdclError::syntax(
                    "Front matter delimiter '---' outside of front matter",
                    parser.position(),
                    Some("Front matter must be the first thing in the document"),
                    213,
                );
                parser.report(err);
                parser.bump();
                parser.synchronize();
            }
            _ => match parse_statement(parser).and_then(|stmt| end_of_statement(parser).map(|_| stmt)) {
                Ok(Statement::KeyValue(kv)) => {
                    if keys.insert(kv.key.name.clone()) {
                        statements.push(Statement::KeyValue(kv));
                    } else {
                        parser.report(duplicate_key(&kv));
                    }
                }
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    parser.report(err);
                    parser.synchronize();
                }
            },
        }
    }

    Document { front_matter, statements }
}

fn parse_front_matter(parser: &mut Parser) -> FrontMatter {
    let open = parser.bump();
    let mut pairs: Vec<KeyValuePair> = Vec::new();

    if let Err(err) = end_of_statement(parser) {
        parser.report(err);
        parser.synchronize();
    }

    loop {
        match parser.peek_kind() {
            TokenKind::Newline | TokenKind::Comment => {
                parser.bump();
            }
            TokenKind::FrontmatterDelimiter => {
                parser.bump();
                if let Err(err) = end_of_statement(parser) {
                    parser.report(err);
                    parser.synchronize();
                }
                break;
            }
            TokenKind::Eof => {
                let pos = parser.position();
                parser.report(SdclError::UnexpectedEof {
                    message: "Front matter is never closed".into(),
                    line: pos.line,
                    column: pos.column,
                    hint: Some(format!("Add a closing '---' line for the front matter opened at {}", open.position)),
                    code: Some(212),
                });
                break;
            }
            TokenKind::Key => match value::parse_key_value(parser).and_then(|kv| end_of_statement(parser).map(|_| kv)) {
                Ok(kv) => {
                    if pairs.iter().any(|p| p.key.name == kv.key.name) {
                        parser.report(duplicate_key(&kv));
                    } else {
                        pairs.push(kv);
                    }
                }
                Err(err) => {
                    parser.report(err);
                    parser.synchronize();
                }
            },
            _ => {
                let err = parser.unexpected("key", Some("Front matter may only contain 'key: value' lines"), 211);
                parser.report(err);
                parser.synchronize();
            }
        }
    }

    FrontMatter { pairs, position: open.position }
}

fn parse_statement(parser: &mut Parser) -> Result<Statement> {
    if parser.at(TokenKind::Key) {
        return value::parse_key_value(parser).map(Statement::KeyValue);
    }
    let expression = value::parse_expression(parser)?;
    Ok(Statement::Expression(ExpressionStatement { expression }))
}

/// A statement ends at a newline or end of input, optionally after a comment.
fn end_of_statement(parser: &mut Parser) -> Result<()> {
    if parser.at(TokenKind::Comment) {
        parser.bump();
    }
    match parser.peek_kind() {
        TokenKind::Newline => {
            parser.bump();
            Ok(())
        }
        TokenKind::Eof => Ok(()),
        _ => Err(parser.unexpected(
            "newline after statement",
            Some("Put each statement on its own line"),
            206,
        )),
    }
}

fn duplicate_key(kv: &KeyValuePair) -> SdclError {
    SdclError::syntax(
        format!("Duplicate key '{}'", kv.key.name),
        kv.key.position,
        Some("Keys must be unique within a document"),
        215,
    )
}
