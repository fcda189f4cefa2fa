//! Side-channel row map
//!
//! Alongside each rendered image the renderer writes `{image}.json`, a
//! row-indexed table of the identifiers it drew. Loading it lets a click
//! position resolve to an identifier without re-parsing the image.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClickMapError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What kind of identifier a chart row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Task,
    Resource,
}

impl IdentifierKind {
    pub fn label(&self) -> &'static str {
        match self {
            IdentifierKind::Task => "task",
            IdentifierKind::Resource => "resource",
        }
    }
}

/// Row-indexed identifier tables for one rendered image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClickMap {
    /// Task identifier per task row
    #[serde(default)]
    pub tasks: Vec<String>,

    /// Resource identifier per resource row
    #[serde(default)]
    pub resources: Vec<String>,
}

impl ClickMap {
    /// Loads the side-channel file for a rendered image.
    pub fn load(path: &Path) -> Result<Self, ClickMapError> {
        let text = fs::read_to_string(path).map_err(|source| ClickMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ClickMapError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Looks a row up in the task table first, then the resource table.
    /// Absence in both is simply "no identifier at this row".
    pub fn identifier_at(&self, row: u32) -> Option<(IdentifierKind, &str)> {
        let row = row as usize;
        self.tasks
            .get(row)
            .map(|id| (IdentifierKind::Task, id.as_str()))
            .or_else(|| {
                self.resources
                    .get(row)
                    .map(|id| (IdentifierKind::Resource, id.as_str()))
            })
    }

    /// Total number of rows with an identifier.
    pub fn row_count(&self) -> usize {
        self.tasks.len().max(self.resources.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_shadow_resources_on_the_same_row() {
        let map = ClickMap {
            tasks: vec!["t1".into()],
            resources: vec!["r1".into(), "r2".into()],
        };
        assert_eq!(map.identifier_at(0), Some((IdentifierKind::Task, "t1")));
        assert_eq!(map.identifier_at(1), Some((IdentifierKind::Resource, "r2")));
        assert_eq!(map.identifier_at(2), None);
        assert_eq!(map.row_count(), 2);
    }

    #[test]
    fn parses_renderer_output() {
        let json = r#"{ "tasks": ["phase1", "phase1.build"], "resources": [] }"#;
        let map: ClickMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.tasks.len(), 2);
        assert_eq!(map.identifier_at(1), Some((IdentifierKind::Task, "phase1.build")));
    }

    #[test]
    fn missing_tables_default_to_empty() {
        let map: ClickMap = serde_json::from_str("{}").unwrap();
        assert_eq!(map.row_count(), 0);
        assert_eq!(map.identifier_at(0), None);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ClickMap::load(Path::new("absent.png.json")).unwrap_err();
        assert!(matches!(err, ClickMapError::Io { .. }));
    }

    #[test]
    fn load_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png.json");
        std::fs::write(&path, "not json").unwrap();
        let err = ClickMap::load(&path).unwrap_err();
        assert!(matches!(err, ClickMapError::Parse { .. }));
    }
}
