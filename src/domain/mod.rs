//! Domain models for plannav
//!
//! Contains the plan index model and merge rules without any I/O concerns.

mod graph;
mod merge;
mod plan;
mod position;

pub use graph::ImportGraph;
pub use merge::{basename, merge_subplan, qualified_name};
pub use plan::{PlanDef, ResourceMap, TaskNode, TaskTree, UpdateRecord};
pub use position::FilePos;
