//! plannav - Reference navigation for hierarchical plan files
//!
//! A plan is a root file plus everything it transitively imports. plannav
//! merges that closure into one namespace tree that remembers where every
//! task and resource was declared or updated, resolves dotted identifiers
//! back to those source locations, and correlates positions on an
//! externally rendered chart image with the same identifiers.

pub mod cli;
pub mod config;
pub mod domain;
pub mod outline;
pub mod preview;
pub mod references;
pub mod render;

pub use domain::{FilePos, PlanDef, TaskNode};
pub use references::{build_plan, find_resource, find_task};
