//! SDCL: a structured-document configuration language with front matter,
//! typed literals and references between values and documents.

pub mod ast;
pub mod config;
pub mod error;
pub mod export;
pub mod lexer;
pub mod limits;
pub mod literal;
pub mod parser;
pub mod resolver;
pub mod value;

pub use ast::Document;
pub use config::SdclConfig;
pub use error::{ErrorCategory, ResolutionErrorKind, Result, SdclError};
pub use limits::Limits;
pub use literal::CountryCode;
pub use parser::{parse, parse_with_limits};
pub use resolver::{
    DocumentSource, NoDocuments, ResolvedDocument, ResolvedStatement, Resolver, resolve, resolve_all,
    resolve_all_with_limits, resolve_with_limits,
};
pub use value::Value;
