//! Source locations in plan files

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A position in a plan file: the file path and a 0-indexed line number.
///
/// Every identifier the index knows about resolves to one or more of these.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilePos {
    /// Path of the file containing the declaration
    pub path: PathBuf,

    /// 0-indexed line of the declaration
    pub line: u32,
}

impl FilePos {
    /// Creates a position from a path and a 0-indexed line
    pub fn new(path: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// Returns the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the 1-indexed line number for display
    pub fn display_line(&self) -> u32 {
        self.line + 1
    }
}

impl fmt::Display for FilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.display_line())
    }
}
