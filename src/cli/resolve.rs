//! `plannav resolve`: look up an identifier's source locations

use std::path::Path;

use anyhow::Result;

use crate::outline::PlanOutline;
use crate::references::{build_plan, find_resource, find_task};

use super::output::Output;

/// What kind of identifier a resolve query names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum IdentifierQuery {
    /// Try the task tree first, fall back to resources
    #[default]
    Auto,
    Task,
    Resource,
}

pub fn run(output: &Output, file: &Path, identifier: &str, kind: IdentifierQuery) -> Result<()> {
    let build = build_plan(&PlanOutline::new(), file)?;
    for warning in &build.warnings {
        output.verbose_ctx("build", &warning.to_string());
    }

    let (label, matches) = match kind {
        IdentifierQuery::Task => ("task", find_task(&build.plan, identifier)),
        IdentifierQuery::Resource => ("resource", find_resource(&build.plan, identifier)),
        IdentifierQuery::Auto => {
            let tasks = find_task(&build.plan, identifier);
            if tasks.is_empty() {
                ("resource", find_resource(&build.plan, identifier))
            } else {
                ("task", tasks)
            }
        }
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "identifier": identifier,
            "kind": label,
            "matches": matches,
        }));
        return Ok(());
    }

    if matches.is_empty() {
        output.line(&format!("No references found for '{}'", identifier));
        return Ok(());
    }

    output.line(&format!("{} '{}':", label, identifier));
    for pos in &matches {
        output.line(&format!("  {}", pos));
    }
    Ok(())
}
