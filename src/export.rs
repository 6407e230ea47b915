// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use serde_json::json;

use crate::SdclError;
use crate::config::SdclConfig;
use crate::error::Result;
use crate::literal::encode_base64;
use crate::resolver::ResolvedDocument;
use crate::value::Value;

/// Convert a resolved value to JSON.
///
/// - Strings, integers, floats, booleans, null → direct mapping
/// - Dates, times and datetimes → ISO 8601 strings
/// - Country codes → their two-letter code
/// - Base64 blobs → re-encoded base64 strings
/// - Arrays, objects → nested JSON structures (object order is kept)
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => json!(b),
        Value::Integer(n) => json!(n),
        Value::Float(n) => json!(n),
        Value::String(s) => json!(s),
        Value::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => json!(t.format("%H:%M:%S%.f").to_string()),
        Value::DateTime(dt) => json!(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Value::Country(c) => json!(c.as_str()),
        Value::Base64(bytes) => json!(encode_base64(bytes)),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(|v| value_to_json(v)).collect()),
        Value::Object(items) => serde_json::Value::Object(
            items.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect(),
        ),
    }
}

/// Export a resolved document to pretty-printed JSON.
///
/// The output has up to three sections, each omitted when empty:
/// `front_matter` and `entries` (objects keyed by top-level key) and
/// `expressions` (an array of bare expression statements).
///
/// # Examples
/// ```
/// let (doc, _) = sdcl::parse("---\ntitle: \"Hi\"\n---\ngreeting: (title)\n");
/// let (resolved, _) = sdcl::resolve(&doc, &sdcl::NoDocuments);
/// let json = sdcl::export::export_document_to_json(&resolved).unwrap();
/// assert!(json.contains("\"greeting\": \"Hi\""));
/// ```
pub fn export_document_to_json(doc: &ResolvedDocument) -> Result<String> {
    let mut top = serde_json::Map::new();

    let front_matter = doc
        .front_matter
        .iter()
        .map(|(k, v)| (k.clone(), value_to_json(v)))
        .collect::<serde_json::Map<_, _>>();
    if !front_matter.is_empty() {
        top.insert("front_matter".into(), serde_json::Value::Object(front_matter));
    }

    let entries = doc
        .entries()
        .map(|(k, v)| (k.to_string(), value_to_json(v)))
        .collect::<serde_json::Map<_, _>>();
    if !entries.is_empty() {
        top.insert("entries".into(), serde_json::Value::Object(entries));
    }

    let expressions = doc.expressions().map(|v| value_to_json(v)).collect::<Vec<_>>();
    if !expressions.is_empty() {
        top.insert("expressions".into(), serde_json::Value::Array(expressions));
    }

    to_pretty(&serde_json::Value::Object(top))
}

/// Serialize diagnostics for tooling.
pub fn errors_to_json(errors: &[SdclError]) -> Result<String> {
    let value = serde_json::to_value(errors).map_err(export_failed)?;
    to_pretty(&value)
}

/// Load an SDCL file together with the documents it references and export
/// the resolved result to JSON.
///
/// # Errors
/// Returns the first file, syntax or resolution error.
pub fn export_sdcl_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let config = SdclConfig::from_file(path)?;
    export_document_to_json(config.resolved())
}

fn to_pretty(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(export_failed)
}

fn export_failed(e: serde_json::Error) -> SdclError {
    SdclError::FileError {
        message: format!("Failed to serialize JSON: {}", e),
        path: String::new(),
        hint: None,
        code: Some(310),
    }
}
