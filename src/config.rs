//! Configuration handling for plannav
//!
//! Configuration is stored in `~/.config/plannav/config.toml` (global) and
//! `plannav.toml` next to the root plan file (plan-local). A plan-local
//! file replaces the global one when present. The renderer binary can
//! always be overridden with the `PLANNAV_RENDERER` environment variable.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::RenderOptions;

/// Plan-local configuration file name, looked up next to the root file.
pub const PLAN_LOCAL_FILE: &str = "plannav.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Where and how to invoke the chart renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Renderer binary name or path
    pub binary: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("planchart"),
        }
    }
}

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Renderer invocation
    pub renderer: RendererConfig,

    /// Default render options for preview/render/watch
    pub preview: RenderOptions,
}

impl Config {
    /// Loads the global configuration, or defaults when none exists.
    pub fn load_global() -> Result<Self> {
        match global_config_path() {
            Some(path) if path.is_file() => Self::parse_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads the configuration for a root plan file: the plan-local file
    /// next to it when present, the global configuration otherwise.
    pub fn for_plan(root: &Path) -> Result<Self> {
        let dir = root.parent().unwrap_or_else(|| Path::new(""));
        let local = dir.join(PLAN_LOCAL_FILE);
        if local.is_file() {
            Self::parse_file(&local)
        } else {
            Self::load_global()
        }
    }

    /// The renderer binary to invoke, honoring `PLANNAV_RENDERER`.
    pub fn renderer_binary(&self) -> PathBuf {
        std::env::var_os("PLANNAV_RENDERER")
            .map(PathBuf::from)
            .unwrap_or_else(|| self.renderer.binary.clone())
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(config)
    }
}

/// Path of the global configuration file, if a config directory exists
/// for this platform.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "plannav").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ChartKind;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.renderer.binary, PathBuf::from("planchart"));
        assert_eq!(config.preview.chart, ChartKind::Gantt);
        assert!(!config.preview.show_ids);
    }

    #[test]
    fn plan_local_file_takes_precedence() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("plan.yaml");
        fs::write(
            dir.path().join(PLAN_LOCAL_FILE),
            r#"
[renderer]
binary = "/opt/render/planchart"

[preview]
chart = "resources"
show_ids = true
"#,
        )
        .unwrap();

        let config = Config::for_plan(&root).unwrap();
        assert_eq!(config.renderer.binary, PathBuf::from("/opt/render/planchart"));
        assert_eq!(config.preview.chart, ChartKind::Resources);
        assert!(config.preview.show_ids);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("plan.yaml");
        fs::write(dir.path().join(PLAN_LOCAL_FILE), "renderer = nonsense").unwrap();

        assert!(Config::for_plan(&root).is_err());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("plan.yaml");
        fs::write(dir.path().join(PLAN_LOCAL_FILE), "[preview]\nshow_ends = true\n").unwrap();

        let config = Config::for_plan(&root).unwrap();
        assert!(config.preview.show_ends);
        assert_eq!(config.renderer.binary, PathBuf::from("planchart"));
    }
}
