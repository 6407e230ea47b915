use super::*;
use crate::ast::{
    ArrayLiteral, Expression, Identifier, KeyValuePair, Literal, LiteralValue, ObjectKey, ObjectLiteral, ObjectPair,
};
use crate::literal;

pub(super) fn parse_key_value(parser: &mut Parser) -> Result<KeyValuePair> {
    let key_tok = parser.expect(TokenKind::Key, None, 208)?;
    parser.expect(TokenKind::Colon, Some("Separate the key and its value with ':'"), 204)?;
    let value = parse_expression(parser)?;

    Ok(KeyValuePair {
        key: Identifier { name: key_tok.literal, position: key_tok.position },
        value,
    })
}

pub(super) fn parse_expression(parser: &mut Parser) -> Result<Expression> {
    match parser.peek_kind() {
        TokenKind::String => parse_string_value(parser),
        TokenKind::Int => parse_integer_value(parser),
        TokenKind::Float => parse_float_value(parser),
        TokenKind::True | TokenKind::False => parse_bool_value(parser),
        TokenKind::Null => parse_null_value(parser),
        kind if kind.is_typed_literal_keyword() => parse_typed_literal(parser),
        TokenKind::LBrace => parse_object_value(parser),
        TokenKind::LBracket => parse_array_value(parser),
        TokenKind::LParen => reference::parse_value_reference(parser),
        TokenKind::DoubleLParen => reference::parse_content_inclusion(parser),
        TokenKind::Dot => reference::parse_external_reference(parser),
        TokenKind::Key => Err(parser.unexpected(
            "a value",
            Some("Bare words are not values; quote strings or wrap references in '(...)'"),
            210,
        )),
        _ => Err(parser.unexpected("a value", Some("Unexpected token in value position"), 210)),
    }
}

fn literal_expr(value: LiteralValue, tok: Token) -> Expression {
    Expression::Literal(Literal { value, lexeme: tok.literal, position: tok.position })
}

fn parse_string_value(parser: &mut Parser) -> Result<Expression> {
    let tok = parser.bump();
    Ok(literal_expr(LiteralValue::String(tok.literal.clone()), tok))
}

fn parse_integer_value(parser: &mut Parser) -> Result<Expression> {
    let tok = parser.bump();
    match tok.literal.parse::<i64>() {
        Ok(n) => Ok(literal_expr(LiteralValue::Integer(n), tok)),
        Err(_) => Err(SdclError::syntax(
            format!("Integer '{}' does not fit in 64 bits", tok.literal),
            tok.position,
            None,
            216,
        )),
    }
}

fn parse_float_value(parser: &mut Parser) -> Result<Expression> {
    let tok = parser.bump();
    match tok.literal.parse::<f64>() {
        Ok(n) => Ok(literal_expr(LiteralValue::Float(n), tok)),
        Err(_) => Err(SdclError::syntax(format!("Invalid float '{}'", tok.literal), tok.position, None, 216)),
    }
}

fn parse_bool_value(parser: &mut Parser) -> Result<Expression> {
    let tok = parser.bump();
    let value = tok.kind == TokenKind::True;
    Ok(literal_expr(LiteralValue::Boolean(value), tok))
}

fn parse_null_value(parser: &mut Parser) -> Result<Expression> {
    let tok = parser.bump();
    Ok(literal_expr(LiteralValue::Null, tok))
}

/// `date "2024-01-01"`, `country "TW"`, ...: a keyword followed by a string
/// whose body is validated here.
fn parse_typed_literal(parser: &mut Parser) -> Result<Expression> {
    let keyword = parser.bump();

    if !parser.at(TokenKind::String) {
        let hint = if parser.at(TokenKind::Colon) {
            format!("'{}' is a keyword and cannot be used as a top-level key", keyword.literal)
        } else {
            format!("Write the value as {} \"{}\"", keyword.literal, example_body(keyword.kind))
        };
        return Err(parser.unexpected(&format!("string after '{}'", keyword.literal), Some(&hint), 217));
    }

    let body = parser.bump();
    let parsed = match keyword.kind {
        TokenKind::Date => literal::parse_date(&body.literal).map(LiteralValue::Date),
        TokenKind::Time => literal::parse_time(&body.literal).map(LiteralValue::Time),
        TokenKind::DateTime => literal::parse_datetime(&body.literal).map(LiteralValue::DateTime),
        TokenKind::Country => literal::parse_country(&body.literal).map(LiteralValue::Country),
        _ => literal::parse_base64(&body.literal).map(LiteralValue::Base64),
    };

    let value = parsed.map_err(|message| SdclError::InvalidLiteral {
        kind: keyword.literal.clone(),
        literal: body.literal.clone(),
        message,
        line: body.position.line,
        column: body.position.column,
        hint: Some(format!("Expected something like {} \"{}\"", keyword.literal, example_body(keyword.kind))),
        code: Some(218),
    })?;

    Ok(Expression::Literal(Literal { value, lexeme: body.literal, position: keyword.position }))
}

fn example_body(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Date => "2024-01-31",
        TokenKind::Time => "13:45:00",
        TokenKind::DateTime => "2024-01-31T13:45:00",
        TokenKind::Country => "TW",
        _ => "aGVsbG8=",
    }
}

fn parse_object_value(parser: &mut Parser) -> Result<Expression> {
    let open = parser.bump(); // consume {
    parser.enter_nesting(open.position)?;
    let mut pairs: Vec<ObjectPair> = Vec::new();

    parser.skip_layout();
    if parser.at(TokenKind::RBrace) {
        parser.bump();
    } else {
        loop {
            let key = parse_object_key(parser)?;
            parser.expect(TokenKind::Colon, Some("Separate the key and its value with ':'"), 204)?;
            parser.skip_layout();
            let value = parse_expression(parser)?;

            if pairs.iter().any(|p| p.key.name == key.name) {
                parser.report(SdclError::syntax(
                    format!("Duplicate key '{}'", key.name),
                    key.position,
                    Some("Keys must be unique within an object"),
                    215,
                ));
            } else {
                pairs.push(ObjectPair { key, value });
            }

            parser.skip_layout();
            match parser.peek_kind() {
                TokenKind::Comma => {
                    let comma = parser.bump();
                    parser.skip_layout();
                    if parser.at(TokenKind::RBrace) {
                        return Err(trailing_comma(comma.position));
                    }
                }
                TokenKind::RBrace => {
                    parser.bump();
                    break;
                }
                _ => return Err(parser.unexpected("',' or '}'", None, 220)),
            }
        }
    }

    parser.leave_nesting();
    Ok(Expression::Object(ObjectLiteral {
        pairs,
        raw: parser.slice_from(open.span.start),
        position: open.position,
    }))
}

/// Object keys are restricted to strings and bare words (keywords included).
fn parse_object_key(parser: &mut Parser) -> Result<ObjectKey> {
    let kind = parser.peek_kind();
    if kind == TokenKind::String || kind == TokenKind::Key || kind.is_keyword() {
        let tok = parser.bump();
        return Ok(ObjectKey {
            name: tok.literal,
            quoted: kind == TokenKind::String,
            position: tok.position,
        });
    }
    Err(parser.unexpected("object key", Some("Object keys must be strings or identifiers"), 221))
}

fn parse_array_value(parser: &mut Parser) -> Result<Expression> {
    let open = parser.bump(); // consume [
    parser.enter_nesting(open.position)?;
    let mut elements = Vec::new();

    parser.skip_layout();
    if parser.at(TokenKind::RBracket) {
        parser.bump();
    } else {
        loop {
            elements.push(parse_expression(parser)?);

            parser.skip_layout();
            match parser.peek_kind() {
                TokenKind::Comma => {
                    let comma = parser.bump();
                    parser.skip_layout();
                    if parser.at(TokenKind::RBracket) {
                        return Err(trailing_comma(comma.position));
                    }
                }
                TokenKind::RBracket => {
                    parser.bump();
                    break;
                }
                _ => return Err(parser.unexpected("',' or ']'", None, 222)),
            }
        }
    }

    parser.leave_nesting();
    Ok(Expression::Array(ArrayLiteral {
        elements,
        raw: parser.slice_from(open.span.start),
        position: open.position,
    }))
}

fn trailing_comma(at: Position) -> SdclError {
    SdclError::syntax("Trailing comma", at, Some("Remove the ',' before the closing bracket"), 219)
}
