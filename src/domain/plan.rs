//! Plan definition model
//!
//! A plan file declares resources, a tree of tasks, historical updates and
//! imports of further plan files. The index only records *names and
//! positions*; scheduling semantics (dates, efforts) are never interpreted.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::position::FilePos;

/// Resource identifier → declaration position.
///
/// Keys are unique within one file's own declarations; merging across files
/// overwrites on collision (later-imported file wins).
pub type ResourceMap = BTreeMap<String, FilePos>;

/// Children of a task group, keyed by child name.
pub type TaskTree = BTreeMap<String, TaskNode>;

/// A node in the task tree: a concrete task or milestone, or a group of
/// further nodes.
///
/// Groups always carry the position of their own declaration, so resolving
/// a dotted identifier that ends on a group still yields a location.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskNode {
    /// A task or milestone declaration
    Leaf(FilePos),

    /// A group declaration with nested children
    Group {
        /// Position of the group declaration itself
        pos: FilePos,
        /// Nested tasks, milestones and sub-groups
        children: TaskTree,
    },
}

impl TaskNode {
    /// Returns the position of this node's declaration
    pub fn pos(&self) -> &FilePos {
        match self {
            TaskNode::Leaf(pos) => pos,
            TaskNode::Group { pos, .. } => pos,
        }
    }

    /// Returns the nested children if this node is a group
    pub fn children(&self) -> Option<&TaskTree> {
        match self {
            TaskNode::Leaf(_) => None,
            TaskNode::Group { children, .. } => Some(children),
        }
    }

    /// Returns true if this node is a group
    pub fn is_group(&self) -> bool {
        matches!(self, TaskNode::Group { .. })
    }
}

/// Tasks and resources recorded under one update date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRecord {
    /// Task entries, keyed by name (flat keys; imported names arrive
    /// prefixed with their sub-plan's qualified name)
    pub tasks: TaskTree,

    /// Resource entries, keyed by identifier
    pub resources: ResourceMap,
}

/// One plan file's declarations, or, for the root after merging, the
/// union of the whole import closure.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDef {
    /// File this definition was loaded from
    pub origin: PathBuf,

    /// Root task tree
    pub tasks: TaskTree,

    /// Resource declarations
    pub resources: ResourceMap,

    /// Update records keyed by date/tag string, iterated in ascending
    /// key order
    pub updates: BTreeMap<String, UpdateRecord>,

    /// Declared imports, resolved to paths, in declaration order
    pub imports: Vec<PathBuf>,
}

impl PlanDef {
    /// Creates an empty definition for the given origin file
    pub fn new(origin: impl Into<PathBuf>) -> Self {
        Self {
            origin: origin.into(),
            tasks: TaskTree::new(),
            resources: ResourceMap::new(),
            updates: BTreeMap::new(),
            imports: Vec::new(),
        }
    }
}
