use super::*;

/// Advance the character iterator and update offset/line/column tracking
pub(super) fn bump(lexer: &mut Lexer) -> Option<char> {
    let curr = lexer.peek;
    if let Some(c) = curr {
        lexer.offset += c.len_utf8();
        if c == '\n' {
            lexer.line += 1;
            lexer.column = 1;
        } else {
            lexer.column += 1;
        }
    }
    lexer.peek = lexer.input.next();
    curr
}

/// Skip insignificant whitespace. Newlines are tokens and are left alone.
pub(super) fn skip_whitespace(lexer: &mut Lexer) {
    while let Some(' ' | '\t') = lexer.peek {
        bump(lexer);
    }
}

/// The character after the current one, without consuming anything.
pub(super) fn peek_second(lexer: &Lexer) -> Option<char> {
    lexer.input.clone().next()
}

/// The two characters after the current one.
pub(super) fn peek_pair(lexer: &Lexer) -> (Option<char>, Option<char>) {
    let mut ahead = lexer.input.clone();
    (ahead.next(), ahead.next())
}
