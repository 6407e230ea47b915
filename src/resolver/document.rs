use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

/// A document with every reference substituted. Values are shared: two
/// references to the same node hold the same `Arc`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedDocument {
    pub front_matter: IndexMap<String, Arc<Value>>,
    pub statements: Vec<ResolvedStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStatement {
    KeyValue { key: String, value: Arc<Value> },
    Expression(Arc<Value>),
}

impl ResolvedDocument {
    /// Body key-value entries, in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Arc<Value>)> {
        self.statements.iter().filter_map(|stmt| match stmt {
            ResolvedStatement::KeyValue { key, value } => Some((key.as_str(), value)),
            ResolvedStatement::Expression(_) => None,
        })
    }

    /// Values of bare expression statements, in document order.
    pub fn expressions(&self) -> impl Iterator<Item = &Arc<Value>> {
        self.statements.iter().filter_map(|stmt| match stmt {
            ResolvedStatement::Expression(value) => Some(value),
            ResolvedStatement::KeyValue { .. } => None,
        })
    }

    /// Top-level value by key; front matter and body share one key space.
    pub fn get(&self, key: &str) -> Option<&Arc<Value>> {
        self.front_matter
            .get(key)
            .or_else(|| self.entries().find(|(k, _)| *k == key).map(|(_, v)| v))
    }

    /// Dotted lookup such as `server.tls.port`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            Some((first, rest)) => self.get(first)?.lookup(rest),
            None => self.get(path).map(|v| v.as_ref()),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.front_matter.keys().map(String::as_str).chain(self.entries().map(|(k, _)| k))
    }

    /// All top-level entries as one object, front matter first.
    pub fn to_value(&self) -> Value {
        let items = self
            .front_matter
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .chain(self.entries().map(|(k, v)| (k.to_string(), Arc::clone(v))))
            .collect();
        Value::Object(items)
    }
}

/// Prints the resolved tree back as SDCL text.
impl fmt::Display for ResolvedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.front_matter.is_empty() {
            writeln!(f, "---")?;
            for (key, value) in &self.front_matter {
                writeln!(f, "{}: {}", key, value)?;
            }
            writeln!(f, "---")?;
        }
        for stmt in &self.statements {
            match stmt {
                ResolvedStatement::KeyValue { key, value } => writeln!(f, "{}: {}", key, value)?,
                ResolvedStatement::Expression(value) => writeln!(f, "{}", value)?,
            }
        }
        Ok(())
    }
}
