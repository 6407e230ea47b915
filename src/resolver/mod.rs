// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::SdclError;
use crate::ast::{Document, Expression, PathSegment, Reference, Statement};
use crate::error::{ResolutionErrorKind, Result};
use crate::lexer::Position;
use crate::limits::Limits;
use crate::value::Value;

mod document;
mod lookup;

pub use document::{ResolvedDocument, ResolvedStatement};

use lookup::Target;

/// Supplies already-parsed documents to external references (`.doc.a.b`).
pub trait DocumentSource {
    fn document(&self, id: &str) -> Option<&Document>;
}

impl DocumentSource for IndexMap<String, Document> {
    fn document(&self, id: &str) -> Option<&Document> {
        self.get(id)
    }
}

impl<S: BuildHasher> DocumentSource for HashMap<String, Document, S> {
    fn document(&self, id: &str) -> Option<&Document> {
        self.get(id)
    }
}

/// A source with no documents; every external reference is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocuments;

impl DocumentSource for NoDocuments {
    fn document(&self, _id: &str) -> Option<&Document> {
        None
    }
}

/// A node in the reference graph: a path inside one document.
/// `document: None` is the document passed to [`Resolver::resolve_document`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NodeKey {
    document: Option<String>,
    path: Vec<String>,
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.document, self.path.is_empty()) {
            (Some(doc), true) => write!(f, ".{}", doc),
            (Some(doc), false) => write!(f, ".{}.{}", doc, self.path.join(".")),
            (None, _) => f.write_str(&self.path.join(".")),
        }
    }
}

/// `Value` resolves a node to its value, `Raw` to the text a content
/// inclusion splices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Mode {
    Value,
    Raw,
}

type Frame = (NodeKey, Mode);

/// Depth a resolved node needs below the point it is entered: open
/// reference frames, and frames plus open literals.
#[derive(Debug, Clone, Copy, Default)]
struct Height {
    references: usize,
    combined: usize,
}

enum Cached {
    Value(Arc<Value>, Height),
    Failed(SdclError),
}

/// A node that ran out of depth, with the depth in use when it was entered.
struct DepthFailure {
    references: usize,
    nesting: usize,
    error: SdclError,
}

/// One resolution pass over a graph of documents.
///
/// Every node is resolved at most once per mode; later references reuse the
/// cached `Arc`. Nodes being resolved sit on an explicit stack, which bounds
/// the reference depth and detects cycles.
///
/// Nested object and array literals count against the same budget as
/// references: at most `max_reference_depth + max_nesting_depth` levels are
/// open at once, and going past either bound is `DepthExceeded`.
///
/// A cached value remembers how deep its own resolution went, and reusing it
/// charges that height at the point of reuse. A depth failure is only reused
/// when the node is reached again with at least as much depth in use. Whether
/// a top-level entry resolves therefore depends only on its own chain, not on
/// which entry was resolved first.
pub struct Resolver<'s> {
    root: Option<&'s Document>,
    source: &'s dyn DocumentSource,
    limits: Limits,
    cache: HashMap<Frame, Cached>,
    depth_failures: HashMap<Frame, DepthFailure>,
    stack: Vec<Frame>,
    nesting: usize,
    peak: Height,
    errors: Vec<SdclError>,
}

impl<'s> Resolver<'s> {
    pub fn new(source: &'s dyn DocumentSource) -> Self {
        Self {
            root: None,
            source,
            limits: Limits::default(),
            cache: HashMap::new(),
            depth_failures: HashMap::new(),
            stack: Vec::new(),
            nesting: 0,
            peak: Height::default(),
            errors: Vec::new(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolve a standalone document. Its own references are resolved against
    /// itself; external references go to the source.
    pub fn resolve_document(&mut self, document: &'s Document) -> ResolvedDocument {
        if !self.root.is_some_and(|root| std::ptr::eq(root, document)) {
            self.cache.retain(|(key, _), _| key.document.is_some());
            self.depth_failures.retain(|(key, _), _| key.document.is_some());
            self.root = Some(document);
        }
        self.resolve_in(None, document)
    }

    /// Resolve the source document registered under `id`.
    pub fn resolve_source_document(&mut self, id: &str) -> Result<ResolvedDocument> {
        let source: &'s dyn DocumentSource = self.source;
        let document = source.document(id).ok_or_else(|| {
            SdclError::resolution(
                ResolutionErrorKind::MissingDocument,
                format!("Document '{}' is not available", id),
                Position::default(),
                Some("Load the document before resolving it"),
            )
        })?;
        Ok(self.resolve_in(Some(id), document))
    }

    pub fn errors(&self) -> &[SdclError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<SdclError> {
        std::mem::take(&mut self.errors)
    }

    fn resolve_in(&mut self, context: Option<&str>, document: &'s Document) -> ResolvedDocument {
        let mut resolved = ResolvedDocument::default();

        for kv in document.front_matter.iter().flat_map(|fm| fm.pairs.iter()) {
            if let Some(value) = self.resolve_entry(context, &kv.key.name, kv.key.position) {
                resolved.front_matter.insert(kv.key.name.clone(), value);
            }
        }

        for stmt in &document.statements {
            match stmt {
                Statement::KeyValue(kv) => {
                    if let Some(value) = self.resolve_entry(context, &kv.key.name, kv.key.position) {
                        resolved.statements.push(ResolvedStatement::KeyValue { key: kv.key.name.clone(), value });
                    }
                }
                Statement::Expression(es) => match self.evaluate(context, &es.expression) {
                    Ok(value) => resolved.statements.push(ResolvedStatement::Expression(value)),
                    Err(err) => self.report(err),
                },
            }
        }

        tracing::debug!(
            document = context.unwrap_or("<root>"),
            statements = resolved.statements.len(),
            errors = self.errors.len(),
            "resolved document"
        );
        resolved
    }

    /// A top-level entry is resolved as a node of its own, so references to it
    /// share its value. A fatal failure drops the entry.
    fn resolve_entry(&mut self, context: Option<&str>, key: &str, at: Position) -> Option<Arc<Value>> {
        let node = NodeKey { document: context.map(String::from), path: vec![key.to_string()] };
        match self.resolve_node(node, Mode::Value, at) {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    fn resolve_node(&mut self, key: NodeKey, mode: Mode, at: Position) -> Result<Arc<Value>> {
        let frame = (key, mode);

        if let Some(start) = self.stack.iter().position(|f| *f == frame) {
            let chain = self.stack[start..]
                .iter()
                .map(|(k, _)| k.to_string())
                .chain(std::iter::once(frame.0.to_string()))
                .collect::<Vec<_>>()
                .join(" -> ");
            tracing::warn!(cycle = %chain, "reference cycle");
            return Err(SdclError::resolution(
                ResolutionErrorKind::Cycle,
                format!("Reference cycle: {}", chain),
                at,
                Some("Replace one reference in the cycle with a value"),
            ));
        }

        let (references, nesting) = (self.stack.len(), self.nesting);
        match self.cache.get(&frame) {
            Some(Cached::Failed(err)) => return Err(err.clone()),
            Some(Cached::Value(value, height)) => {
                let (value, height) = (Arc::clone(value), *height);
                self.charge(&frame.0, height, at)?;
                return Ok(value);
            }
            None => {}
        }

        if let Some(failure) = self.depth_failures.get(&frame) {
            if references >= failure.references && nesting >= failure.nesting {
                return Err(failure.error.clone());
            }
        }

        self.charge(&frame.0, Height { references: 1, combined: 1 }, at)?;

        tracing::trace!(node = %frame.0, ?mode, depth = references, nesting, "resolving reference");
        let outer = std::mem::replace(
            &mut self.peak,
            Height { references: references + 1, combined: references + nesting + 1 },
        );
        self.stack.push(frame.clone());
        let result = self.evaluate_node(&frame.0, mode, at);
        self.stack.pop();
        let height = Height {
            references: self.peak.references - references,
            combined: self.peak.combined - references - nesting,
        };
        self.peak = Height {
            references: outer.references.max(self.peak.references),
            combined: outer.combined.max(self.peak.combined),
        };

        match &result {
            Ok(value) => {
                self.cache.insert(frame, Cached::Value(Arc::clone(value), height));
            }
            Err(err) if err.resolution_kind() == Some(ResolutionErrorKind::DepthExceeded) => {
                let failure = DepthFailure { references, nesting, error: err.clone() };
                self.depth_failures.insert(frame, failure);
            }
            Err(err) if err.is_fatal() => {
                self.cache.insert(frame, Cached::Failed(err.clone()));
            }
            Err(_) => {}
        }
        result
    }

    /// Combined bound on open reference frames and open literals.
    fn depth_budget(&self) -> usize {
        self.limits.max_reference_depth.saturating_add(self.limits.max_nesting_depth)
    }

    /// Check that `node` fits `height` more levels on top of the current depth
    /// and record the deepest point reached.
    fn charge(&mut self, node: &NodeKey, height: Height, at: Position) -> Result<()> {
        let references = self.stack.len() + height.references;
        if references > self.limits.max_reference_depth {
            tracing::warn!(node = %node, depth = self.stack.len(), "reference depth exceeded");
            return Err(SdclError::resolution(
                ResolutionErrorKind::DepthExceeded,
                format!("Reference chain deeper than {} while resolving '{}'", self.limits.max_reference_depth, node),
                at,
                Some("Shorten the chain of references or raise Limits::max_reference_depth"),
            ));
        }
        let combined = self.stack.len() + self.nesting + height.combined;
        if combined > self.depth_budget() {
            return Err(self.nesting_exceeded(Some(node), at));
        }
        self.peak.references = self.peak.references.max(references);
        self.peak.combined = self.peak.combined.max(combined);
        Ok(())
    }

    fn nesting_exceeded(&self, node: Option<&NodeKey>, at: Position) -> SdclError {
        let node = node.or_else(|| self.stack.last().map(|(key, _)| key));
        tracing::warn!(node = ?node.map(ToString::to_string), nesting = self.nesting, "resolution depth exceeded");
        let message = match node {
            Some(node) => format!(
                "Literals and references nested deeper than {} levels while resolving '{}'",
                self.depth_budget(),
                node
            ),
            None => format!("Literals and references nested deeper than {} levels", self.depth_budget()),
        };
        SdclError::resolution(
            ResolutionErrorKind::DepthExceeded,
            message,
            at,
            Some("Flatten nested literals along the reference chain or raise the Limits"),
        )
    }

    /// Evaluate one object or array level, charging it to the depth budget.
    fn nested(&mut self, at: Position, build: impl FnOnce(&mut Self) -> Result<Value>) -> Result<Arc<Value>> {
        let combined = self.stack.len() + self.nesting + 1;
        if combined > self.depth_budget() {
            return Err(self.nesting_exceeded(None, at));
        }
        self.peak.combined = self.peak.combined.max(combined);
        self.nesting += 1;
        let result = build(self);
        self.nesting -= 1;
        result.map(Arc::new)
    }

    fn evaluate_node(&mut self, key: &NodeKey, mode: Mode, at: Position) -> Result<Arc<Value>> {
        match (lookup::locate(self, key, at)?, mode) {
            (Target::Node { context, expression }, Mode::Value) => self.evaluate(context.as_deref(), expression),
            (Target::Node { context, expression }, Mode::Raw) => self.raw_text(context.as_deref(), expression),
            (Target::Value(value), Mode::Value) => Ok(value),
            (Target::Value(value), Mode::Raw) => Ok(Arc::new(Value::String(value_text(&value)))),
            (Target::Document(document), Mode::Value) => {
                let mut items = IndexMap::new();
                for kv in document.pairs() {
                    let entry = NodeKey { document: key.document.clone(), path: vec![kv.key.name.clone()] };
                    items.insert(kv.key.name.clone(), self.resolve_node(entry, Mode::Value, at)?);
                }
                Ok(Arc::new(Value::Object(items)))
            }
            (Target::Document(document), Mode::Raw) => Ok(Arc::new(Value::String(document.to_string()))),
        }
    }

    /// Evaluate an expression in the context of one document. Non-fatal
    /// reference failures are reported and become `null`.
    fn evaluate(&mut self, context: Option<&str>, expression: &'s Expression) -> Result<Arc<Value>> {
        match expression {
            Expression::Literal(lit) => Ok(Arc::new(Value::from(&lit.value))),
            Expression::Object(obj) => self.nested(obj.position, |this| {
                let mut items = IndexMap::with_capacity(obj.pairs.len());
                for pair in &obj.pairs {
                    items.insert(pair.key.name.clone(), this.evaluate(context, &pair.value)?);
                }
                Ok(Value::Object(items))
            }),
            Expression::Array(arr) => self.nested(arr.position, |this| {
                let items = arr
                    .elements
                    .iter()
                    .map(|el| this.evaluate(context, el))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Array(items))
            }),
            reference => match self.resolve_reference(context, reference) {
                Ok(value) => Ok(value),
                Err(err) if err.is_fatal() => Err(err),
                Err(err) => {
                    self.report(err);
                    Ok(Arc::new(Value::Null))
                }
            },
        }
    }

    /// Resolve a reference expression, propagating every failure.
    fn resolve_reference(&mut self, context: Option<&str>, expression: &'s Expression) -> Result<Arc<Value>> {
        match expression {
            Expression::ValueReference(r) => self.resolve_node(local_key(context, r)?, Mode::Value, r.position),
            Expression::ContentInclusion(r) => self.resolve_node(local_key(context, r)?, Mode::Raw, r.position),
            Expression::ExternalReference(r) => self.resolve_node(external_key(r)?, Mode::Value, r.position),
            other => self.evaluate(context, other),
        }
    }

    /// Text a content inclusion splices in. Reference chains are followed to
    /// a concrete node.
    fn raw_text(&mut self, context: Option<&str>, expression: &'s Expression) -> Result<Arc<Value>> {
        match expression {
            Expression::ValueReference(r) | Expression::ContentInclusion(r) => {
                self.resolve_node(local_key(context, r)?, Mode::Raw, r.position)
            }
            Expression::ExternalReference(r) => self.resolve_node(external_key(r)?, Mode::Raw, r.position),
            other => Ok(Arc::new(Value::String(other.raw_text()))),
        }
    }

    fn document(&self, id: Option<&str>) -> Option<&'s Document> {
        let source: &'s dyn DocumentSource = self.source;
        match id {
            None => self.root,
            Some(id) => source.document(id),
        }
    }

    fn report(&mut self, error: SdclError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn segments(path: &[PathSegment]) -> Result<Vec<String>> {
    path.iter()
        .map(|seg| match seg {
            PathSegment::Key(ident) => Ok(ident.name.clone()),
            PathSegment::Index { value, position } => Err(SdclError::resolution(
                ResolutionErrorKind::ArrayIndex,
                format!("Integer path segment '{}' is not supported", value),
                *position,
                Some("Arrays cannot be indexed by a reference; reference the whole array"),
            )),
        })
        .collect()
}

fn local_key(context: Option<&str>, reference: &Reference) -> Result<NodeKey> {
    Ok(NodeKey { document: context.map(String::from), path: segments(&reference.path)? })
}

fn external_key(reference: &Reference) -> Result<NodeKey> {
    let mut path = segments(&reference.path)?;
    if path.is_empty() {
        return Err(SdclError::resolution(
            ResolutionErrorKind::Unresolved,
            "External reference without a document name",
            reference.position,
            None,
        ));
    }
    let document = path.remove(0);
    Ok(NodeKey { document: Some(document), path })
}

/// Resolve every reference in `document`, looking up external documents in
/// `source`.
pub fn resolve(document: &Document, source: &dyn DocumentSource) -> (ResolvedDocument, Vec<SdclError>) {
    resolve_with_limits(document, source, Limits::default())
}

pub fn resolve_with_limits(
    document: &Document,
    source: &dyn DocumentSource,
    limits: Limits,
) -> (ResolvedDocument, Vec<SdclError>) {
    let mut resolver = Resolver::new(source).with_limits(limits);
    let resolved = resolver.resolve_document(document);
    (resolved, resolver.take_errors())
}

/// Resolve a batch of source documents in one pass with one shared cache.
/// A document that fails, even fatally, does not stop the others.
pub fn resolve_all(
    source: &dyn DocumentSource,
    ids: &[&str],
) -> (IndexMap<String, ResolvedDocument>, Vec<SdclError>) {
    resolve_all_with_limits(source, ids, Limits::default())
}

pub fn resolve_all_with_limits(
    source: &dyn DocumentSource,
    ids: &[&str],
    limits: Limits,
) -> (IndexMap<String, ResolvedDocument>, Vec<SdclError>) {
    let mut resolver = Resolver::new(source).with_limits(limits);
    let mut resolved = IndexMap::new();
    for id in ids {
        match resolver.resolve_source_document(id) {
            Ok(doc) => {
                resolved.insert(id.to_string(), doc);
            }
            Err(err) => resolver.report(err),
        }
    }
    (resolved, resolver.take_errors())
}

#[cfg(test)]
mod tests;
