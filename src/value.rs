// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;

use crate::ast::LiteralValue;
use crate::literal::{CountryCode, encode_base64};

/// A fully resolved value. Composite values hold their children behind `Arc`
/// so that every reference to the same node shares one allocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Country(CountryCode),
    Base64(Vec<u8>),
    Array(Vec<Arc<Value>>),
    Object(IndexMap<String, Arc<Value>>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Country(_) => "country",
            Value::Base64(_) => "base64",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self { Some(s) } else { None }
    }

    pub fn as_i64(&self) -> Option<i64> {
        if let Value::Integer(n) = self { Some(*n) } else { None }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self { Some(*b) } else { None }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        if let Value::Base64(bytes) = self { Some(bytes) } else { None }
    }

    pub fn as_array(&self) -> Option<&[Arc<Value>]> {
        if let Value::Array(items) = self { Some(items) } else { None }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Arc<Value>>> {
        if let Value::Object(items) = self { Some(items) } else { None }
    }

    /// Child of an object by key.
    pub fn get(&self, key: &str) -> Option<&Arc<Value>> {
        self.as_object().and_then(|items| items.get(key))
    }

    /// Follow a dotted path such as `server.tls.port` through nested objects.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |current, seg| current.get(seg).map(|v| v.as_ref()))
    }
}

impl From<&LiteralValue> for Value {
    fn from(lit: &LiteralValue) -> Self {
        match lit {
            LiteralValue::String(s) => Value::String(s.clone()),
            LiteralValue::Integer(n) => Value::Integer(*n),
            LiteralValue::Float(n) => Value::Float(*n),
            LiteralValue::Boolean(b) => Value::Boolean(*b),
            LiteralValue::Null => Value::Null,
            LiteralValue::Date(d) => Value::Date(*d),
            LiteralValue::Time(t) => Value::Time(*t),
            LiteralValue::DateTime(dt) => Value::DateTime(*dt),
            LiteralValue::Country(c) => Value::Country(*c),
            LiteralValue::Base64(bytes) => Value::Base64(bytes.clone()),
        }
    }
}

/// Prints the value in SDCL surface syntax.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{:.1}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Date(d) => write!(f, "date \"{}\"", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "time \"{}\"", t.format("%H:%M:%S%.f")),
            Value::DateTime(dt) => write!(f, "datetime \"{}\"", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Country(c) => write!(f, "country \"{}\"", c),
            Value::Base64(bytes) => write!(f, "base64 \"{}\"", encode_base64(bytes)),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(items) if items.is_empty() => f.write_str("{}"),
            Value::Object(items) => {
                f.write_str("{ ")?;
                for (i, (key, value)) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\": {}", key, value)?;
                }
                f.write_str(" }")
            }
        }
    }
}
