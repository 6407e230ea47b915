// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::lexer::Position;
use crate::literal::CountryCode;

/// Behaviour shared by every syntax node, used for diagnostics.
pub trait Node {
    /// Literal text of the token that started this node.
    fn token_literal(&self) -> &str;
    fn position(&self) -> Position;
}

/// Root of a parsed SDCL file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub front_matter: Option<FrontMatter>,
    pub statements: Vec<Statement>,
}

/// Key-value pairs between the two `---` lines at the top of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub pairs: Vec<KeyValuePair>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    KeyValue(KeyValuePair),
    Expression(ExpressionStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    pub key: Identifier,
    pub value: Expression,
}

/// A bare expression on its own line, e.g. an object literal or `(key)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Object(ObjectLiteral),
    Array(ArrayLiteral),
    /// `(a.b)`
    ValueReference(Reference),
    /// `((a.b))`
    ContentInclusion(Reference),
    /// `.doc.a.b`
    ExternalReference(Reference),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    /// Source text of the value: the string body for strings and typed literals,
    /// the token text for everything else.
    pub lexeme: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Country(CountryCode),
    Base64(Vec<u8>),
}

impl LiteralValue {
    /// Keyword that introduces this literal, for typed literals only.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            LiteralValue::Date(_) => Some("date"),
            LiteralValue::Time(_) => Some("time"),
            LiteralValue::DateTime(_) => Some("datetime"),
            LiteralValue::Country(_) => Some("country"),
            LiteralValue::Base64(_) => Some("base64"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLiteral {
    pub pairs: Vec<ObjectPair>,
    /// Exact source slice from `{` to `}`.
    pub raw: String,
    pub position: Position,
}

impl ObjectLiteral {
    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.pairs.iter().find(|p| p.key.name == key).map(|p| &p.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|p| p.key.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPair {
    pub key: ObjectKey,
    pub value: Expression,
}

/// Object keys are either bare identifiers or string literals; two keys are
/// equal when their text is equal, regardless of the form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub name: String,
    pub quoted: bool,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
    /// Exact source slice from `[` to `]`.
    pub raw: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub path: Vec<PathSegment>,
    pub position: Position,
}

impl Reference {
    pub fn dotted(&self) -> String {
        self.path.iter().map(PathSegment::as_str).collect::<Vec<_>>().join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(Identifier),
    /// Integer segment such as the `0` in `(list.0)`; accepted by the parser,
    /// rejected during resolution.
    Index { value: String, position: Position },
}

impl PathSegment {
    pub fn as_str(&self) -> &str {
        match self {
            PathSegment::Key(ident) => &ident.name,
            PathSegment::Index { value, .. } => value,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            PathSegment::Key(ident) => ident.position,
            PathSegment::Index { position, .. } => *position,
        }
    }
}

impl Document {
    /// Top-level key-value pairs: front matter first, then body.
    pub fn pairs(&self) -> impl Iterator<Item = &KeyValuePair> {
        self.front_matter
            .iter()
            .flat_map(|fm| fm.pairs.iter())
            .chain(self.statements.iter().filter_map(|s| match s {
                Statement::KeyValue(kv) => Some(kv),
                Statement::Expression(_) => None,
            }))
    }

    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.pairs().find(|kv| kv.key.name == key).map(|kv| &kv.value)
    }

    /// Identifiers of every document named by an external reference, in order
    /// of first appearance.
    pub fn external_document_ids(&self) -> Vec<String> {
        fn walk(expr: &Expression, out: &mut Vec<String>) {
            match expr {
                Expression::ExternalReference(reference) => {
                    if let Some(first) = reference.path.first() {
                        let id = first.as_str().to_string();
                        if !out.contains(&id) {
                            out.push(id);
                        }
                    }
                }
                Expression::Object(obj) => obj.pairs.iter().for_each(|p| walk(&p.value, out)),
                Expression::Array(arr) => arr.elements.iter().for_each(|e| walk(e, out)),
                _ => {}
            }
        }

        let mut out = Vec::new();
        for kv in self.front_matter.iter().flat_map(|fm| fm.pairs.iter()) {
            walk(&kv.value, &mut out);
        }
        for stmt in &self.statements {
            match stmt {
                Statement::KeyValue(kv) => walk(&kv.value, &mut out),
                Statement::Expression(es) => walk(&es.expression, &mut out),
            }
        }
        out
    }
}

impl Expression {
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Expression::ValueReference(_) | Expression::ContentInclusion(_) | Expression::ExternalReference(_)
        )
    }

    /// Raw text used when this node is spliced in by a content inclusion.
    pub fn raw_text(&self) -> String {
        match self {
            Expression::Literal(lit) => lit.lexeme.clone(),
            Expression::Object(obj) => obj.raw.clone(),
            Expression::Array(arr) => arr.raw.clone(),
            other => other.to_string(),
        }
    }
}

// --- Node ---

impl Node for Document {
    fn token_literal(&self) -> &str {
        if self.front_matter.is_some() {
            return "---";
        }
        self.statements.first().map_or("", |s| s.token_literal())
    }

    fn position(&self) -> Position {
        match (&self.front_matter, self.statements.first()) {
            (Some(fm), _) => fm.position,
            (None, Some(stmt)) => stmt.position(),
            (None, None) => Position::default(),
        }
    }
}

impl Node for Statement {
    fn token_literal(&self) -> &str {
        match self {
            Statement::KeyValue(kv) => kv.token_literal(),
            Statement::Expression(es) => es.expression.token_literal(),
        }
    }

    fn position(&self) -> Position {
        match self {
            Statement::KeyValue(kv) => kv.position(),
            Statement::Expression(es) => es.expression.position(),
        }
    }
}

impl Node for KeyValuePair {
    fn token_literal(&self) -> &str {
        &self.key.name
    }

    fn position(&self) -> Position {
        self.key.position
    }
}

impl Node for Identifier {
    fn token_literal(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Position {
        self.position
    }
}

impl Node for Expression {
    fn token_literal(&self) -> &str {
        match self {
            Expression::Literal(lit) => match lit.value.keyword() {
                Some(keyword) => keyword,
                None => &lit.lexeme,
            },
            Expression::Object(_) => "{",
            Expression::Array(_) => "[",
            Expression::ValueReference(_) => "(",
            Expression::ContentInclusion(_) => "((",
            Expression::ExternalReference(_) => ".",
        }
    }

    fn position(&self) -> Position {
        match self {
            Expression::Literal(lit) => lit.position,
            Expression::Object(obj) => obj.position,
            Expression::Array(arr) => arr.position,
            Expression::ValueReference(r) | Expression::ContentInclusion(r) | Expression::ExternalReference(r) => {
                r.position
            }
        }
    }
}

// --- canonical printer ---

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fm) = &self.front_matter {
            writeln!(f, "---")?;
            for kv in &fm.pairs {
                writeln!(f, "{}", kv)?;
            }
            writeln!(f, "---")?;
        }
        for stmt in &self.statements {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::KeyValue(kv) => write!(f, "{}", kv),
            Statement::Expression(es) => write!(f, "{}", es.expression),
        }
    }
}

impl fmt::Display for KeyValuePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key.name, self.value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, self.value.keyword()) {
            (LiteralValue::String(s), _) => write!(f, "\"{}\"", s),
            (_, Some(keyword)) => write!(f, "{} \"{}\"", keyword, self.lexeme),
            (_, None) => f.write_str(&self.lexeme),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(lit) => write!(f, "{}", lit),
            Expression::Object(obj) => {
                if obj.pairs.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, pair) in obj.pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if pair.key.quoted {
                        write!(f, "\"{}\": {}", pair.key.name, pair.value)?;
                    } else {
                        write!(f, "{}: {}", pair.key.name, pair.value)?;
                    }
                }
                f.write_str(" }")
            }
            Expression::Array(arr) => {
                f.write_str("[")?;
                for (i, el) in arr.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", el)?;
                }
                f.write_str("]")
            }
            Expression::ValueReference(r) => write!(f, "({})", r.dotted()),
            Expression::ContentInclusion(r) => write!(f, "(({}))", r.dotted()),
            Expression::ExternalReference(r) => write!(f, ".{}", r.dotted()),
        }
    }
}
