//! `plannav imports`: import closure listing and cycle diagnostics

use std::path::Path;

use anyhow::Result;

use crate::domain::ImportGraph;
use crate::outline::PlanOutline;
use crate::references::build_plan;

use super::output::Output;

pub fn run(output: &Output, file: &Path) -> Result<()> {
    let build = build_plan(&PlanOutline::new(), file)?;
    let graph = ImportGraph::from_edges(&build.edges);
    let cyclic = graph.has_cycle();

    if output.is_json() {
        output.data(&serde_json::json!({
            "files": build.files,
            "cyclic": cyclic,
            "warnings": build
                .warnings
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    output.line(&format!("Import closure of {}:", file.display()));
    for path in &build.files {
        output.line(&format!("  {}", path.display()));
    }

    for warning in &build.warnings {
        output.warning(&warning.to_string());
    }
    if cyclic {
        output.warning("import declarations contain a cycle; it was pruned during loading");
    }

    output.line(&format!("{} file(s)", build.files.len()));
    Ok(())
}
