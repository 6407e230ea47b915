use super::*;
use crate::ast::Node;

/// Where a path lands.
pub(super) enum Target<'s> {
    /// An unresolved syntax node, evaluated in the context of its document.
    Node { context: Option<String>, expression: &'s Expression },
    /// A value reached by walking through an already resolved reference.
    Value(Arc<Value>),
    /// A bare `.doc` external reference: the whole document.
    Document(&'s Document),
}

/// Walk `key.path` through the top-level key space of its document, then into
/// object pairs. A reference met along the way is resolved and the walk
/// continues over its value.
pub(super) fn locate<'s>(resolver: &mut Resolver<'s>, key: &NodeKey, at: Position) -> Result<Target<'s>> {
    let document = resolver.document(key.document.as_deref()).ok_or_else(|| missing_document(key, at))?;

    let Some((first, rest)) = key.path.split_first() else {
        return Ok(Target::Document(document));
    };

    let expression = document.get(first).ok_or_else(|| unresolved(key, &key.path[..1], at))?;
    let mut cursor = Cursor::Node(expression);

    for (i, segment) in rest.iter().enumerate() {
        let walked = &key.path[..i + 1];
        cursor = match cursor {
            Cursor::Node(expression) => match expression {
                Expression::Object(obj) => match obj.get(segment) {
                    Some(child) => Cursor::Node(child),
                    None => return Err(unresolved(key, &key.path[..i + 2], at)),
                },
                reference if reference.is_reference() => {
                    let node = NodeKey { document: key.document.clone(), path: walked.to_vec() };
                    let value = resolver.resolve_node(node, Mode::Value, reference.position())?;
                    step(key, walked, &value, segment, at)?
                }
                other => return Err(not_an_object(key, walked, kind_of(other), at)),
            },
            Cursor::Value(value) => step(key, walked, &value, segment, at)?,
        };
    }

    Ok(match cursor {
        Cursor::Node(expression) => Target::Node { context: key.document.clone(), expression },
        Cursor::Value(value) => Target::Value(value),
    })
}

enum Cursor<'s> {
    Node(&'s Expression),
    Value(Arc<Value>),
}

fn step<'s>(key: &NodeKey, walked: &[String], value: &Value, segment: &str, at: Position) -> Result<Cursor<'s>> {
    match value {
        Value::Object(items) => match items.get(segment) {
            Some(child) => Ok(Cursor::Value(Arc::clone(child))),
            None => {
                let mut missing = walked.to_vec();
                missing.push(segment.to_string());
                Err(unresolved(key, &missing, at))
            }
        },
        other => Err(not_an_object(key, walked, other.type_name(), at)),
    }
}

fn kind_of(expression: &Expression) -> &'static str {
    match expression {
        Expression::Array(_) => "array",
        Expression::Literal(lit) => Value::from(&lit.value).type_name(),
        _ => "value",
    }
}

fn prefix(key: &NodeKey, walked: &[String]) -> String {
    NodeKey { document: key.document.clone(), path: walked.to_vec() }.to_string()
}

fn unresolved(key: &NodeKey, walked: &[String], at: Position) -> SdclError {
    SdclError::resolution(
        ResolutionErrorKind::Unresolved,
        format!("Unresolved reference '{}': nothing at '{}'", key, prefix(key, walked)),
        at,
        Some("Check the spelling of the path"),
    )
}

fn not_an_object(key: &NodeKey, walked: &[String], found: &str, at: Position) -> SdclError {
    SdclError::resolution(
        ResolutionErrorKind::NotAnObject,
        format!("Cannot resolve '{}': '{}' is {} {}, not an object", key, prefix(key, walked), article(found), found),
        at,
        Some("Only object keys can be followed by a reference path"),
    )
}

fn missing_document(key: &NodeKey, at: Position) -> SdclError {
    let id = key.document.as_deref().unwrap_or("<root>");
    SdclError::resolution(
        ResolutionErrorKind::MissingDocument,
        format!("Unresolved reference '{}': document '{}' is not loaded", key, id),
        at,
        Some("External documents must be loaded before resolution"),
    )
}

fn article(noun: &str) -> &'static str {
    if noun.starts_with(['a', 'e', 'i', 'o', 'u']) { "an" } else { "a" }
}
