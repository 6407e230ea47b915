// Author: Dustin Pilgrim
// License: MIT

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::SdclError;
use crate::ast::Document;
use crate::error::Result;
use crate::limits::Limits;
use crate::parser;
use crate::resolver::{ResolvedDocument, Resolver};
use crate::value::Value;

mod access;
mod conversion;
mod helpers;
mod validation;

/// File extension of SDCL documents loaded for external references.
pub const EXTENSION: &str = "sdcl";

/// A parsed and resolved SDCL document plus the external documents it refers
/// to, with typed access to the resolved values.
#[derive(Debug, Clone)]
pub struct SdclConfig {
    document: Document,
    documents: IndexMap<String, Document>,
    resolved: ResolvedDocument,
    parse_errors: Vec<SdclError>,
    resolve_errors: Vec<SdclError>,
    limits: Limits,
}

impl SdclConfig {
    /// Parse and resolve a config from a string (no file I/O). External
    /// references only see documents added with [`SdclConfig::inject_document`].
    ///
    /// # Examples
    /// ```
    /// use sdcl::SdclConfig;
    ///
    /// let config = SdclConfig::from_str("server: { port: 8080 }\n").unwrap();
    /// let port: u16 = config.get("server.port").unwrap();
    /// assert_eq!(port, 8080);
    /// ```
    ///
    /// # Errors
    /// Returns the first lexical, syntax or resolution error.
    pub fn from_str(content: &str) -> Result<Self> {
        Self::lenient_from_str(content).into_strict()
    }

    /// Like [`SdclConfig::from_str`] but never fails; every error is kept and
    /// available from [`SdclConfig::errors`].
    pub fn lenient_from_str(content: &str) -> Self {
        Self::build(content, Limits::default())
    }

    pub fn from_str_with_limits(content: &str, limits: Limits) -> Result<Self> {
        Self::build(content, limits).into_strict()
    }

    /// Load an SDCL file and every document it references, searching the
    /// file's own directory first.
    ///
    /// # Example
    /// ```ignore
    /// let config = SdclConfig::from_file("app.sdcl")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = helpers::expand_home(path.as_ref())?;
        let base_dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self::from_file_with_base(&path, &base_dir)
    }

    /// Load an SDCL file, looking up external documents in `base_dir` and
    /// then in the user's config directory (`<config_dir>/sdcl`).
    ///
    /// A reference `.base.key` loads `base.sdcl`. Missing documents are
    /// skipped here and reported by resolution.
    pub fn from_file_with_base<P: AsRef<Path>, B: AsRef<Path>>(path: P, base_dir: B) -> Result<Self> {
        let path = helpers::expand_home(path.as_ref())?;
        let content = read_document(&path, 301)?;
        tracing::debug!(path = %path.display(), "loading config");

        let mut config = Self::parse(&content, Limits::default());
        config.load_external_documents(&helpers::expand_home(base_dir.as_ref())?)?;
        config.resolve();
        config.into_strict()
    }

    /// Try `primary` first; if it cannot be read, load `fallback` instead.
    pub fn from_file_with_fallback<P: AsRef<Path>, F: AsRef<Path>>(primary: P, fallback: F) -> Result<Self> {
        match Self::from_file(&primary) {
            Ok(config) => Ok(config),
            Err(SdclError::FileError { code: Some(301), .. }) => {
                Self::from_file(&fallback).map_err(|e| match e {
                    SdclError::FileError { message, .. } => SdclError::FileError {
                        message: format!(
                            "Failed to load config from '{}' or fallback '{}': {}",
                            primary.as_ref().display(),
                            fallback.as_ref().display(),
                            message
                        ),
                        path: format!("{} (fallback: {})", primary.as_ref().display(), fallback.as_ref().display()),
                        hint: Some("Check that at least one of the config files exists".into()),
                        code: Some(301),
                    },
                    other => other,
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Replace the resolution limits and resolve again. The parse itself is
    /// not repeated; use [`SdclConfig::from_str_with_limits`] to bound nesting.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self.resolve();
        self
    }

    fn build(content: &str, limits: Limits) -> Self {
        let mut config = Self::parse(content, limits);
        config.resolve();
        config
    }

    fn parse(content: &str, limits: Limits) -> Self {
        let (document, parse_errors) = parser::parse_with_limits(content, limits);
        Self {
            document,
            documents: IndexMap::new(),
            resolved: ResolvedDocument::default(),
            parse_errors,
            resolve_errors: Vec::new(),
            limits,
        }
    }

    /// Fail with the first error, logging all of them.
    fn into_strict(self) -> Result<Self> {
        let errors = self.errors();
        for error in &errors {
            tracing::warn!(%error, "config error");
        }
        match errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(self),
        }
    }

    /// Resolve the main document again, e.g. after injecting documents.
    pub fn resolve(&mut self) {
        let mut resolver = Resolver::new(&self.documents).with_limits(self.limits);
        self.resolved = resolver.resolve_document(&self.document);
        self.resolve_errors = resolver.take_errors();
    }

    /// Register a parsed document for external references (`.id.path`).
    /// Call [`SdclConfig::resolve`] afterwards.
    pub fn inject_document(&mut self, id: impl Into<String>, document: Document) {
        self.documents.insert(id.into(), document);
    }

    /// Syntax errors of the main document followed by resolution errors.
    pub fn errors(&self) -> Vec<SdclError> {
        self.parse_errors.iter().chain(&self.resolve_errors).cloned().collect()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn resolved(&self) -> &ResolvedDocument {
        &self.resolved
    }

    pub fn all_documents(&self) -> &IndexMap<String, Document> {
        &self.documents
    }

    pub fn document_ids(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }

    pub fn has_document(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn get_document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Load every document reachable through external references, breadth
    /// first. Each document is loaded once.
    fn load_external_documents(&mut self, base_dir: &Path) -> Result<()> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, PathBuf)> = self
            .document
            .external_document_ids()
            .into_iter()
            .map(|id| (id, base_dir.to_path_buf()))
            .collect();

        while let Some((id, from_dir)) = queue.pop_front() {
            if !visited.insert(id.clone()) || self.documents.contains_key(&id) {
                continue;
            }

            let Some(path) = helpers::find_document(&id, &[from_dir.as_path(), base_dir]) else {
                tracing::debug!(document = %id, "external document not found");
                continue;
            };

            if self.documents.len() >= self.limits.max_documents {
                return Err(SdclError::FileError {
                    message: format!("More than {} external documents", self.limits.max_documents),
                    path: path.to_string_lossy().to_string(),
                    hint: Some("Raise Limits::max_documents or reduce external references".into()),
                    code: Some(303),
                });
            }

            let content = read_document(&path, 302)?;
            let (document, errors) = parser::parse_with_limits(&content, self.limits);
            for error in &errors {
                tracing::warn!(path = %path.display(), %error, "error in external document");
            }
            self.parse_errors.extend(errors);
            tracing::debug!(document = %id, path = %path.display(), "loaded external document");

            let dir = path.parent().map_or_else(|| base_dir.to_path_buf(), Path::to_path_buf);
            queue.extend(document.external_document_ids().into_iter().map(|next| (next, dir.clone())));
            self.documents.insert(id, document);
        }

        Ok(())
    }
}

fn read_document(path: &Path, code: u32) -> Result<String> {
    fs::read_to_string(path).map_err(|e| SdclError::FileError {
        message: format!("Failed to read file: {}", e),
        path: path.to_string_lossy().to_string(),
        hint: Some("Check that the file exists and is readable".into()),
        code: Some(code),
    })
}
