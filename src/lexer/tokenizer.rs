use super::*;
use super::scanner::{bump, peek_pair, peek_second, skip_whitespace};

pub(super) fn next_token(lexer: &mut Lexer) -> Token {
    skip_whitespace(lexer);

    let start = lexer.current_position();

    match lexer.peek {
        Some('\n') | Some('\r') => tokenize_newline(lexer, start),
        Some('{') => tokenize_symbol(lexer, start, TokenKind::LBrace),
        Some('}') => tokenize_symbol(lexer, start, TokenKind::RBrace),
        Some('[') => tokenize_symbol(lexer, start, TokenKind::LBracket),
        Some(']') => tokenize_symbol(lexer, start, TokenKind::RBracket),
        Some(':') => tokenize_symbol(lexer, start, TokenKind::Colon),
        Some(',') => tokenize_symbol(lexer, start, TokenKind::Comma),
        Some('.') => tokenize_symbol(lexer, start, TokenKind::Dot),
        Some('(') => tokenize_paren(lexer, start, '(', TokenKind::LParen, TokenKind::DoubleLParen),
        Some(')') => tokenize_paren(lexer, start, ')', TokenKind::RParen, TokenKind::DoubleRParen),
        Some('-') => tokenize_dashes(lexer, start),
        Some('#') => tokenize_comment(lexer, start),
        Some('"') => tokenize_string(lexer, start),
        Some(c) if c.is_ascii_digit() => tokenize_number(lexer, start),
        Some(c) if c.is_alphabetic() || c == '_' => tokenize_identifier_or_keyword(lexer, start),
        Some(ch) => tokenize_unexpected_char(lexer, start, ch),
        None => finish(lexer, start, TokenKind::Eof, String::new()),
    }
}

fn finish(lexer: &Lexer, start: Position, kind: TokenKind, literal: String) -> Token {
    Token {
        kind,
        literal,
        span: Span { start: start.offset, end: lexer.offset },
        position: start,
    }
}

fn tokenize_newline(lexer: &mut Lexer, start: Position) -> Token {
    if bump(lexer) == Some('\r') {
        if lexer.peek == Some('\n') {
            bump(lexer);
        } else {
            // a lone '\r' still ends the line
            lexer.line += 1;
            lexer.column = 1;
        }
    }
    finish(lexer, start, TokenKind::Newline, "\n".into())
}

fn tokenize_symbol(lexer: &mut Lexer, start: Position, kind: TokenKind) -> Token {
    let ch = bump(lexer).map(String::from).unwrap_or_default();
    finish(lexer, start, kind, ch)
}

fn tokenize_paren(lexer: &mut Lexer, start: Position, paren: char, single: TokenKind, double: TokenKind) -> Token {
    bump(lexer);
    if lexer.peek == Some(paren) {
        bump(lexer);
        return finish(lexer, start, double, format!("{paren}{paren}"));
    }
    finish(lexer, start, single, paren.to_string())
}

fn tokenize_dashes(lexer: &mut Lexer, start: Position) -> Token {
    if peek_pair(lexer) == (Some('-'), Some('-')) {
        bump(lexer);
        bump(lexer);
        bump(lexer);
        return finish(lexer, start, TokenKind::FrontmatterDelimiter, "---".into());
    }
    tokenize_unexpected_char(lexer, start, '-')
}

fn tokenize_comment(lexer: &mut Lexer, start: Position) -> Token {
    bump(lexer); // consume '#'
    let mut text = String::new();
    while let Some(ch) = lexer.peek {
        if ch == '\n' || ch == '\r' {
            break;
        }
        text.push(ch);
        bump(lexer);
    }
    finish(lexer, start, TokenKind::Comment, text)
}

fn tokenize_string(lexer: &mut Lexer, start: Position) -> Token {
    bump(lexer); // consume opening quote
    let mut content = String::new();
    let mut closed = false;

    while let Some(ch) = bump(lexer) {
        if ch == '"' {
            closed = true;
            break;
        }
        content.push(ch);
    }

    if !closed {
        lexer.errors.push(SdclError::unclosed_string(start));
    }

    finish(lexer, start, TokenKind::String, content)
}

fn tokenize_number(lexer: &mut Lexer, start: Position) -> Token {
    let mut num = String::new();
    let mut kind = TokenKind::Int;

    consume_digits(lexer, &mut num);

    // only a '.' followed by a digit continues the number
    if lexer.peek == Some('.') && peek_second(lexer).is_some_and(|c| c.is_ascii_digit()) {
        kind = TokenKind::Float;
        num.push('.');
        bump(lexer);
        consume_digits(lexer, &mut num);
    }

    finish(lexer, start, kind, num)
}

fn consume_digits(lexer: &mut Lexer, into: &mut String) {
    while let Some(ch) = lexer.peek {
        if !ch.is_ascii_digit() {
            break;
        }
        into.push(ch);
        bump(lexer);
    }
}

fn tokenize_identifier_or_keyword(lexer: &mut Lexer, start: Position) -> Token {
    let mut ident = String::new();

    while let Some(ch) = lexer.peek {
        if ch.is_alphanumeric() || ch == '_' {
            ident.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    let kind = match ident.as_str() {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "date" => TokenKind::Date,
        "time" => TokenKind::Time,
        "datetime" => TokenKind::DateTime,
        "country" => TokenKind::Country,
        "base64" => TokenKind::Base64,
        _ => TokenKind::Key,
    };

    finish(lexer, start, kind, ident)
}

fn tokenize_unexpected_char(lexer: &mut Lexer, start: Position, ch: char) -> Token {
    bump(lexer);
    lexer.errors.push(SdclError::illegal_character(ch, start));
    finish(lexer, start, TokenKind::Illegal, ch.to_string())
}
