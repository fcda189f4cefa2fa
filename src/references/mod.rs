//! Plan reference building and lookup
//!
//! [`build_plan`] loads a root plan file and its whole import closure into
//! one merged [`PlanDef`](crate::domain::PlanDef); [`find_task`] and
//! [`find_resource`] resolve identifiers against the merged result. There
//! is no cache: every build re-reads every file in the closure.

mod builder;
mod index;

pub use builder::{build_plan, normalize_path, Build, BuildError, BuildWarning};
pub use index::{find_resource, find_task};
