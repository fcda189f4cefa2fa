//! Invoking the external chart renderer
//!
//! The renderer is an opaque subprocess: given a plan file and options it
//! writes `{basename}.{chart-kind}.png` next to the plan file and a
//! side-channel row map at `{image}.json`. The runner waits synchronously
//! and surfaces the combined output; a new run simply supersedes the
//! previous artifacts.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use super::options::{ChartKind, RenderOptions};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch renderer {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer exited with {status}:\n{output}")]
    Failed { status: String, output: String },
}

/// Artifacts and output of one successful render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    /// The exported chart image
    pub image: PathBuf,

    /// The row → identifier side-channel file
    pub click_map: PathBuf,

    /// Combined stdout/stderr of the renderer
    pub output: String,
}

/// Handle on the configured renderer binary.
#[derive(Debug, Clone)]
pub struct Renderer {
    binary: PathBuf,
}

impl Renderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the renderer binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Renders the plan file once, blocking until the renderer exits.
    pub fn render(&self, root: &Path, options: &RenderOptions) -> Result<RenderOutcome, RenderError> {
        let args = options.to_args(root);
        let result = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|source| RenderError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let mut output = String::from_utf8_lossy(&result.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&result.stderr));

        if !result.status.success() {
            return Err(RenderError::Failed {
                status: result.status.to_string(),
                output,
            });
        }

        let image = image_path(root, options.chart);
        let click_map = click_map_path(&image);
        Ok(RenderOutcome {
            image,
            click_map,
            output,
        })
    }
}

/// Where the renderer writes the chart image for a plan file:
/// the plan-file extension (`.yaml`/`.yml`) is dropped, everything else is
/// kept, then `.{chart-kind}.png` is appended.
pub fn image_path(root: &Path, chart: ChartKind) -> PathBuf {
    let name = root.to_string_lossy();
    let lowered = name.to_lowercase();
    let stem = if lowered.ends_with(".yaml") {
        &name[..name.len() - 5]
    } else if lowered.ends_with(".yml") {
        &name[..name.len() - 4]
    } else {
        &name[..]
    };
    PathBuf::from(format!("{}.{}.png", stem, chart.as_str()))
}

/// Where the renderer writes the side-channel map for an image.
pub fn click_map_path(image: &Path) -> PathBuf {
    let mut name = image.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}
