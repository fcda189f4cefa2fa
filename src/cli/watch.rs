//! `plannav watch`: re-render on every change in the import closure
//!
//! Watches the parent directories of every file in the closure (editors
//! often replace files instead of rewriting them) and filters events down
//! to closure members. After each render the closure is resolved again so
//! newly added imports are picked up.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;

use crate::config::Config;
use crate::outline::PlanOutline;
use crate::references::{build_plan, normalize_path};
use crate::render::{RenderOptions, Renderer};

use super::output::Output;
use super::render_cmd::RenderArgs;

/// Debounce window for editor save bursts.
const DEBOUNCE_MS: u64 = 500;

pub fn run(output: &Output, file: &Path, args: &RenderArgs) -> Result<()> {
    // Watcher events carry absolute paths; resolve the closure from an
    // absolute root so membership checks line up.
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let file = &normalize_path(&cwd.join(file));

    let config = Config::for_plan(file)?;
    let options = args.apply(config.preview.clone());
    let renderer = Renderer::new(config.renderer_binary());

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(DEBOUNCE_MS), tx)
        .context("Failed to set up file watcher")?;

    let mut closure = closure_files(output, file);
    let mut watched_dirs = watch_dirs(&closure);
    for dir in &watched_dirs {
        debouncer
            .watcher()
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
    }

    render_once(output, &renderer, file, &options);
    output.success(&format!(
        "Watching {} file(s); press Ctrl-C to stop",
        closure.len()
    ));

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events
                    .iter()
                    .any(|e| closure.contains(&normalize_path(&e.path)));
                if !relevant {
                    continue;
                }

                render_once(output, &renderer, file, &options);

                // Imports may have changed: re-resolve the closure and
                // adjust the watched directories.
                let next_closure = closure_files(output, file);
                let next_dirs = watch_dirs(&next_closure);
                for dir in watched_dirs.difference(&next_dirs) {
                    let _ = debouncer.watcher().unwatch(dir);
                }
                for dir in next_dirs.difference(&watched_dirs) {
                    if let Err(e) = debouncer.watcher().watch(dir, RecursiveMode::NonRecursive) {
                        output.warning(&format!("Failed to watch {}: {}", dir.display(), e));
                    }
                }
                closure = next_closure;
                watched_dirs = next_dirs;
            }
            Ok(Err(error)) => {
                output.warning(&format!("Watch error: {:?}", error));
            }
            Err(_) => break,
        }
    }
    Ok(())
}

/// Resolves the current import closure; falls back to just the root when
/// the plan cannot be built (it is still worth watching for the fix).
fn closure_files(output: &Output, file: &Path) -> HashSet<PathBuf> {
    match build_plan(&PlanOutline::new(), file) {
        Ok(build) => {
            for warning in &build.warnings {
                output.verbose_ctx("build", &warning.to_string());
            }
            build.files.into_iter().collect()
        }
        Err(e) => {
            output.warning(&e.to_string());
            HashSet::from([normalize_path(file)])
        }
    }
}

fn watch_dirs(closure: &HashSet<PathBuf>) -> HashSet<PathBuf> {
    closure
        .iter()
        .map(|path| {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            if dir.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                dir.to_path_buf()
            }
        })
        .collect()
}

fn render_once(output: &Output, renderer: &Renderer, file: &Path, options: &RenderOptions) {
    match renderer.render(file, options) {
        Ok(outcome) => {
            if !outcome.output.trim().is_empty() {
                output.verbose_ctx("render", outcome.output.trim_end());
            }
            output.success(&format!("Rendered {}", outcome.image.display()));
        }
        Err(e) => output.error(&e.to_string()),
    }
}
