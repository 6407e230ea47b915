// Author: Dustin Pilgrim
// License: MIT

/// Bounds on parsing and resolution work.
///
/// Deeply nested literals and long reference chains are turned into reported
/// errors instead of unbounded recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of object/array literals (default: 128).
    pub max_nesting_depth: usize,
    /// Maximum number of references being resolved at once along one chain (default: 64).
    pub max_reference_depth: usize,
    /// Maximum number of documents a loader pulls in for one config (default: 1024).
    pub max_documents: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nesting_depth: 128,
            max_reference_depth: 64,
            max_documents: 1024,
        }
    }
}

impl Limits {
    /// Limits with no restrictions (for testing).
    pub fn unlimited() -> Self {
        Self {
            max_nesting_depth: usize::MAX,
            max_reference_depth: usize::MAX,
            max_documents: usize::MAX,
        }
    }
}
