// Author: Dustin Pilgrim
// License: MIT

use serde::Serialize;
use thiserror::Error;

use crate::lexer::Position;

pub type Result<T> = std::result::Result<T, SdclError>;

/// Why a reference could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionErrorKind {
    /// No value lives at the referenced path.
    Unresolved,
    /// The path tries to descend into a scalar or an array.
    NotAnObject,
    /// Integer path segments are not supported; arrays are not index addressable.
    ArrayIndex,
    /// An external reference names a document the source does not provide.
    MissingDocument,
    /// The reference graph loops back onto a node still being resolved.
    Cycle,
    /// The chain of references is deeper than `Limits::max_reference_depth`.
    DepthExceeded,
}

impl ResolutionErrorKind {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResolutionErrorKind::Cycle | ResolutionErrorKind::DepthExceeded)
    }
}

/// Broad family an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Resolution,
    Type,
    File,
}

/// The main error type for SDCL lexing, parsing and resolution.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum SdclError {
    /// Raised for characters that cannot start any token.
    #[error("[SDCL] Unexpected character '{character}' at {line}:{column}{}{}", fmt_hint(.hint), fmt_code(.code))]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a string literal runs to the end of input.
    #[error("[SDCL] Unclosed string starting at {line}:{column}{}{}", fmt_hint(.hint), fmt_code(.code))]
    UnclosedString {
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[SDCL] Syntax Error at {line}:{column}: {message}{}{}", fmt_hint(.hint), fmt_code(.code))]
    SyntaxError {
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[SDCL] Unexpected EOF at {line}:{column}: {message}{}{}", fmt_hint(.hint), fmt_code(.code))]
    UnexpectedEof {
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// A typed literal whose body does not match its type's syntax.
    #[error("[SDCL] Invalid {kind} literal \"{literal}\" at {line}:{column}: {message}{}{}", fmt_hint(.hint), fmt_code(.code))]
    InvalidLiteral {
        kind: String,
        literal: String,
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[SDCL] Resolution Error ({kind:?}) at {line}:{column}: {message}{}{}", fmt_hint(.hint), fmt_code(.code))]
    ResolutionError {
        kind: ResolutionErrorKind,
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[SDCL] Type Error at {line}:{column}: {message}{}{}", fmt_hint(.hint), fmt_code(.code))]
    TypeError {
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[SDCL] File Error '{path}': {message}{}{}", fmt_hint(.hint), fmt_code(.code))]
    FileError {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
}

fn fmt_hint(hint: &Option<String>) -> String {
    hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h))
}

fn fmt_code(code: &Option<u32>) -> String {
    code.map_or(String::new(), |c| format!(" Code: {}", c))
}

impl SdclError {
    pub(crate) fn illegal_character(character: char, position: Position) -> Self {
        SdclError::UnexpectedCharacter {
            character,
            line: position.line,
            column: position.column,
            hint: Some(match character {
                '-' => "A single '-' is not valid; use '---' for front matter (negative numbers are not supported)".into(),
                _ => "Unexpected character in input".into(),
            }),
            code: Some(101),
        }
    }

    pub(crate) fn unclosed_string(position: Position) -> Self {
        SdclError::UnclosedString {
            line: position.line,
            column: position.column,
            hint: Some("String literal not closed".into()),
            code: Some(102),
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, position: Position, hint: Option<&str>, code: u32) -> Self {
        SdclError::SyntaxError {
            message: message.into(),
            line: position.line,
            column: position.column,
            hint: hint.map(Into::into),
            code: Some(code),
        }
    }

    pub(crate) fn resolution(
        kind: ResolutionErrorKind,
        message: impl Into<String>,
        position: Position,
        hint: Option<&str>,
    ) -> Self {
        let code = match kind {
            ResolutionErrorKind::Unresolved => 501,
            ResolutionErrorKind::NotAnObject => 502,
            ResolutionErrorKind::ArrayIndex => 503,
            ResolutionErrorKind::MissingDocument => 504,
            ResolutionErrorKind::Cycle => 505,
            ResolutionErrorKind::DepthExceeded => 506,
        };
        SdclError::ResolutionError {
            kind,
            message: message.into(),
            line: position.line,
            column: position.column,
            hint: hint.map(Into::into),
            code: Some(code),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SdclError::UnexpectedCharacter { .. } | SdclError::UnclosedString { .. } => ErrorCategory::Lexical,
            SdclError::SyntaxError { .. } | SdclError::UnexpectedEof { .. } | SdclError::InvalidLiteral { .. } => {
                ErrorCategory::Syntax
            }
            SdclError::ResolutionError { .. } => ErrorCategory::Resolution,
            SdclError::TypeError { .. } => ErrorCategory::Type,
            SdclError::FileError { .. } => ErrorCategory::File,
        }
    }

    /// Cyclic references and runaway reference depth cannot be recovered locally.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SdclError::ResolutionError { kind, .. } if kind.is_fatal())
    }

    pub fn resolution_kind(&self) -> Option<ResolutionErrorKind> {
        match self {
            SdclError::ResolutionError { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<u32> {
        match self {
            SdclError::UnexpectedCharacter { code, .. }
            | SdclError::UnclosedString { code, .. }
            | SdclError::SyntaxError { code, .. }
            | SdclError::UnexpectedEof { code, .. }
            | SdclError::InvalidLiteral { code, .. }
            | SdclError::ResolutionError { code, .. }
            | SdclError::TypeError { code, .. }
            | SdclError::FileError { code, .. } => *code,
        }
    }

    /// `(line, column)` of the error, if it has a source position.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            SdclError::UnexpectedCharacter { line, column, .. }
            | SdclError::UnclosedString { line, column, .. }
            | SdclError::SyntaxError { line, column, .. }
            | SdclError::UnexpectedEof { line, column, .. }
            | SdclError::InvalidLiteral { line, column, .. }
            | SdclError::ResolutionError { line, column, .. }
            | SdclError::TypeError { line, column, .. } => Some((*line, *column)),
            SdclError::FileError { .. } => None,
        }
    }
}
