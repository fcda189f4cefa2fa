//! Building the merged plan from a root file's import closure
//!
//! The walk is depth-first over declared imports, guarded by a visited set
//! seeded with the root: a file is loaded at most once per build, revisits
//! are pruned and reported as warnings. Each freshly visited sub-plan is
//! merged into the root before its own imports are followed, so merge
//! order is import declaration order.

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::domain::{merge_subplan, qualified_name, FilePos, PlanDef, ResourceMap, TaskNode, TaskTree, UpdateRecord};
use crate::outline::{last_named, ImportSource, SymbolError, SymbolNode, SymbolSource};

#[derive(Debug, Error)]
pub enum BuildError {
    /// The root file itself yielded no structure; nothing can be built.
    #[error("cannot index plan {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: SymbolError,
    },
}

/// Non-fatal conditions encountered during the closure walk.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildWarning {
    /// A file was imported again after it had already been loaded; the
    /// recursion was pruned there.
    AlreadyImported { path: PathBuf, declared_in: PathBuf },

    /// An imported file could not be loaded; its subtree was skipped.
    ImportSkipped { path: PathBuf, reason: String },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::AlreadyImported { path, declared_in } => write!(
                f,
                "{} already loaded, skipping import declared in {}",
                path.display(),
                declared_in.display()
            ),
            BuildWarning::ImportSkipped { path, reason } => {
                write!(f, "skipping import {}: {}", path.display(), reason)
            }
        }
    }
}

/// Result of a closure build: the merged plan plus what the walk saw.
#[derive(Debug)]
pub struct Build {
    /// The merged plan definition
    pub plan: PlanDef,

    /// Files loaded, in visit order, root first
    pub files: Vec<PathBuf>,

    /// Declared import edges (importer, imported), including pruned ones
    pub edges: Vec<(PathBuf, PathBuf)>,

    /// Non-fatal conditions encountered
    pub warnings: Vec<BuildWarning>,
}

/// Loads `root` and its transitive imports into one merged plan.
///
/// Only a root file without structure fails the build; every other
/// condition degrades to a warning. No state is kept between calls; the
/// whole closure is re-read every time.
pub fn build_plan<S>(source: &S, root: &Path) -> Result<Build, BuildError>
where
    S: SymbolSource + ImportSource,
{
    let root_path = normalize_path(root);
    let plan = load_file(source, &root_path).map_err(|source| BuildError::Root {
        path: root_path.clone(),
        source,
    })?;

    let mut build = Build {
        plan,
        files: vec![root_path.clone()],
        edges: Vec::new(),
        warnings: Vec::new(),
    };
    let mut visited: HashSet<PathBuf> = HashSet::new();
    visited.insert(root_path.clone());

    let imports = build.plan.imports.clone();
    absorb_imports(source, &mut build, &mut visited, &root_path, "", &imports);
    Ok(build)
}

/// Depth-first walk over one file's declared imports, merging each freshly
/// visited sub-plan into the root under its qualified name.
fn absorb_imports<S>(
    source: &S,
    build: &mut Build,
    visited: &mut HashSet<PathBuf>,
    from: &Path,
    prefix: &str,
    imports: &[PathBuf],
) where
    S: SymbolSource + ImportSource,
{
    for path in imports {
        build.edges.push((from.to_path_buf(), path.clone()));

        if visited.contains(path) {
            build.warnings.push(BuildWarning::AlreadyImported {
                path: path.clone(),
                declared_in: from.to_path_buf(),
            });
            continue;
        }

        let sub = match load_file(source, path) {
            Ok(sub) => sub,
            Err(e) => {
                build.warnings.push(BuildWarning::ImportSkipped {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        visited.insert(path.clone());
        build.files.push(path.clone());

        let qualified = qualified_name(prefix, path);
        let sub_imports = sub.imports.clone();
        merge_subplan(&mut build.plan, sub, &qualified);
        absorb_imports(source, build, visited, path, &qualified, &sub_imports);
    }
}

/// Loads one file's own declarations through the symbol source, without
/// following imports.
fn load_file<S>(source: &S, path: &Path) -> Result<PlanDef, SymbolError>
where
    S: SymbolSource + ImportSource,
{
    let symbols = source.structure(path)?;
    let mut plan = PlanDef::new(path);

    if let Some(node) = last_named(&symbols, "resources") {
        plan.resources = collect_resources(node, path);
    }
    if let Some(node) = last_named(&symbols, "tasks") {
        plan.tasks = collect_tasks(&node.children, path);
    }
    if let Some(node) = last_named(&symbols, "updates") {
        plan.updates = collect_updates(node, path)
            .into_iter()
            .collect();
    }

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    plan.imports = source
        .import_list(path)?
        .iter()
        .map(|entry| normalize_path(&dir.join(entry)))
        .collect();

    Ok(plan)
}

/// Extracts `identifier → position` from a resources container: each item's
/// first entry must be labeled `resource`; anything else is dropped.
fn collect_resources(node: &SymbolNode, path: &Path) -> ResourceMap {
    node.children
        .iter()
        .filter_map(|item| item.children.first())
        .filter(|decl| decl.name == "resource" && !decl.detail.is_empty())
        .map(|decl| (decl.detail.clone(), FilePos::new(path, decl.span.start)))
        .collect()
}

/// Reduces task items into a tree. An item's entries reveal its type
/// (`task`, `milestone` or `group`) and identifier; a `group` with a
/// `tasks` entry recurses, a group without one degrades to a leaf.
/// Unrecognized or unnamed items are dropped.
fn collect_tasks(items: &[SymbolNode], path: &Path) -> TaskTree {
    let mut tree = TaskTree::new();
    for item in items {
        let mut kind = "";
        let mut name = "";
        let mut sub_tasks: Option<&SymbolNode> = None;

        for entry in &item.children {
            match entry.name.as_str() {
                "task" | "milestone" | "group" => {
                    kind = &entry.name;
                    name = &entry.detail;
                }
                "tasks" => sub_tasks = Some(entry),
                _ => {}
            }
        }
        if name.is_empty() {
            continue;
        }

        let pos = FilePos::new(path, item.span.start);
        let node = match (kind, sub_tasks) {
            ("task", _) | ("milestone", _) | ("group", None) => TaskNode::Leaf(pos),
            ("group", Some(sub)) => TaskNode::Group {
                pos,
                children: collect_tasks(&sub.children, path),
            },
            _ => continue,
        };
        tree.insert(name.to_string(), node);
    }
    tree
}

/// Extracts update records: each item needs an `update` entry for its date
/// key; `tasks` and `resources` entries are reduced like their top-level
/// counterparts.
fn collect_updates(node: &SymbolNode, path: &Path) -> Vec<(String, UpdateRecord)> {
    let mut updates = Vec::new();
    for item in &node.children {
        let mut date: Option<String> = None;
        let mut record = UpdateRecord::default();

        for entry in &item.children {
            match entry.name.as_str() {
                "update" => date = Some(entry.detail.clone()),
                "tasks" => record.tasks = collect_tasks(&entry.children, path),
                "resources" => record.resources = collect_resources(entry, path),
                _ => {}
            }
        }
        if let Some(date) = date.filter(|d| !d.is_empty()) {
            updates.push((date, record));
        }
    }
    updates
}

/// Lexically normalizes a path: resolves `.` and `..` components without
/// touching the filesystem, so closure membership checks compare equal for
/// equal spellings.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if !can_pop || !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
