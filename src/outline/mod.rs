//! Structural outlines of plan files
//!
//! The reference builder never parses plan files itself; it consumes a
//! [`SymbolSource`] that turns a file into a labeled tree of named elements
//! with line spans, and an [`ImportSource`] that extracts the raw `imports`
//! list (scalar list items do not appear in the structural tree). Both seams
//! take fakes in tests.

mod plan_file;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use plan_file::{scan_outline, PlanOutline};

#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed plan file {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// A span of lines in a source file, 0-indexed and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// First line of the element
    pub start: u32,
    /// Last line of the element (including nested children)
    pub end: u32,
}

impl LineSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// One element of a file's structural tree.
///
/// Mapping entries carry their key as `name` and their scalar value (if
/// any) as `detail`; sequence items carry their index as `name` and expose
/// their mapping entries as `children`.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolNode {
    /// Element label (mapping key, or sequence index)
    pub name: String,

    /// Scalar value of the element, empty for containers
    pub detail: String,

    /// Line span of the element
    pub span: LineSpan,

    /// Nested elements
    pub children: Vec<SymbolNode>,
}

impl SymbolNode {
    /// Returns the first child carrying the given label
    pub fn child_named(&self, name: &str) -> Option<&SymbolNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Returns the last top-level node carrying the given label, mirroring the
/// "last declaration wins" lookup over a file's outline.
pub fn last_named<'a>(nodes: &'a [SymbolNode], name: &str) -> Option<&'a SymbolNode> {
    nodes.iter().rev().find(|n| n.name == name)
}

/// Produces the structural tree of a plan file.
pub trait SymbolSource {
    /// Returns the file's top-level elements, or an error when the file
    /// cannot be read or has no recognizable structure.
    fn structure(&self, path: &Path) -> Result<Vec<SymbolNode>, SymbolError>;
}

/// Extracts list-valued scalar fields from a plan file's raw text.
pub trait ImportSource {
    /// Returns the entries of the file's `imports` list, empty when the
    /// field is absent.
    fn import_list(&self, path: &Path) -> Result<Vec<String>, SymbolError>;
}
