//! Merging imported sub-plans into a root plan
//!
//! Merge rules:
//! - Resources: simple overwrite, later-imported file wins on collision.
//!   No prefixing.
//! - Tasks: the sub-plan's whole task tree becomes one group in the parent
//!   tree, keyed by the sub-plan's file basename, nested under the path of
//!   its qualified name. The group's own position is line 0 of the sub-plan
//!   file.
//! - Updates: union by date key. Colliding dates union their resource maps
//!   (later wins per key) and union their task maps with imported task
//!   names prefixed by the sub-plan's qualified name path.

use std::path::Path;

use super::plan::{PlanDef, TaskNode, TaskTree};
use super::position::FilePos;

/// Builds the qualified name of an imported sub-plan: the parent's
/// qualified name dotted with the sub-plan's basename, or the basename
/// alone at depth 1.
pub fn qualified_name(parent: &str, path: &Path) -> String {
    let base = basename(path);
    if parent.is_empty() {
        base.to_string()
    } else {
        format!("{}.{}", parent, base)
    }
}

/// Returns the file basename without its extension chain: `sub/part.yaml`
/// → `part`.
pub fn basename(path: &Path) -> &str {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    name.split('.').next().unwrap_or(name)
}

/// Merges a loaded sub-plan into the root definition under the given
/// qualified name. The sub-plan's `imports` list is not carried over; the
/// closure walk owns import traversal.
pub fn merge_subplan(root: &mut PlanDef, sub: PlanDef, qualified: &str) {
    // Resources: later-imported wins.
    root.resources.extend(sub.resources);

    // Tasks: one group per sub-plan, keyed by basename, nested at the
    // qualified name's path.
    let segments: Vec<&str> = qualified.split('.').collect();
    let (key, ancestors) = match segments.split_last() {
        Some((key, ancestors)) => (*key, ancestors),
        None => return,
    };
    let group = TaskNode::Group {
        pos: FilePos::new(sub.origin.clone(), 0),
        children: sub.tasks,
    };
    subtree_children_mut(&mut root.tasks, ancestors).insert(key.to_string(), group);

    // Updates: union by date, last-writer-wins per key, task names
    // prefixed with the qualified name path.
    for (date, record) in sub.updates {
        let merged = root.updates.entry(date).or_default();
        merged.resources.extend(record.resources);
        for (name, node) in record.tasks {
            merged.tasks.insert(format!("{}.{}", qualified, name), node);
        }
    }
}

/// Walks the tree along `path`, returning the children map of the deepest
/// group that exists. Ancestors are created by earlier merges; a missing or
/// non-group segment ends the walk at the level reached.
fn subtree_children_mut<'a>(tree: &'a mut TaskTree, path: &[&str]) -> &'a mut TaskTree {
    match path.split_first() {
        Some((segment, rest)) if matches!(tree.get(*segment), Some(TaskNode::Group { .. })) => {
            match tree.get_mut(*segment) {
                Some(TaskNode::Group { children, .. }) => subtree_children_mut(children, rest),
                _ => unreachable!(),
            }
        }
        _ => tree,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::super::plan::UpdateRecord;
    use super::*;

    fn leaf(path: &str, line: u32) -> TaskNode {
        TaskNode::Leaf(FilePos::new(path, line))
    }

    #[test]
    fn basename_strips_extension() {
        assert_eq!(basename(Path::new("dir/part.yaml")), "part");
        assert_eq!(basename(Path::new("part.gantt.png")), "part");
        assert_eq!(basename(Path::new("noext")), "noext");
    }

    #[test]
    fn qualified_name_at_depths() {
        assert_eq!(qualified_name("", Path::new("a/part.yaml")), "part");
        assert_eq!(qualified_name("part", Path::new("b/sub.yaml")), "part.sub");
    }

    #[test]
    fn tasks_become_basename_group() {
        let mut root = PlanDef::new("root.yaml");
        let mut sub = PlanDef::new("part.yaml");
        sub.tasks.insert("build".into(), leaf("part.yaml", 4));

        merge_subplan(&mut root, sub, "part");

        let group = root.tasks.get("part").expect("group present");
        assert!(group.is_group());
        assert_eq!(group.pos(), &FilePos::new("part.yaml", 0));
        assert_eq!(
            group.children().unwrap().get("build"),
            Some(&leaf("part.yaml", 4))
        );
    }

    #[test]
    fn nested_import_lands_under_parent_group() {
        let mut root = PlanDef::new("root.yaml");

        let mut child = PlanDef::new("child.yaml");
        child.tasks.insert("t".into(), leaf("child.yaml", 2));
        merge_subplan(&mut root, child, "child");

        let mut grandchild = PlanDef::new("grand.yaml");
        grandchild.tasks.insert("g".into(), leaf("grand.yaml", 1));
        merge_subplan(&mut root, grandchild, "child.grand");

        let child_group = root.tasks.get("child").unwrap();
        let nested = child_group.children().unwrap().get("grand").unwrap();
        assert!(nested.is_group());
        assert_eq!(
            nested.children().unwrap().get("g"),
            Some(&leaf("grand.yaml", 1))
        );
    }

    #[test]
    fn resources_overwrite_without_prefixing() {
        let mut root = PlanDef::new("root.yaml");
        root.resources
            .insert("dev".into(), FilePos::new("root.yaml", 1));

        let mut sub = PlanDef::new("part.yaml");
        sub.resources
            .insert("dev".into(), FilePos::new("part.yaml", 9));
        sub.resources
            .insert("qa".into(), FilePos::new("part.yaml", 10));

        merge_subplan(&mut root, sub, "part");

        assert_eq!(
            root.resources.get("dev"),
            Some(&FilePos::new("part.yaml", 9))
        );
        assert_eq!(
            root.resources.get("qa"),
            Some(&FilePos::new("part.yaml", 10))
        );
    }

    #[test]
    fn updates_union_by_date_with_prefixed_task_names() {
        let mut root = PlanDef::new("root.yaml");
        let mut record = UpdateRecord::default();
        record.tasks.insert("t1".into(), leaf("root.yaml", 20));
        record
            .resources
            .insert("dev".into(), FilePos::new("root.yaml", 21));
        root.updates.insert("2021-02-01".into(), record);

        let mut sub = PlanDef::new("part.yaml");
        let mut sub_record = UpdateRecord::default();
        sub_record.tasks.insert("build".into(), leaf("part.yaml", 5));
        sub_record
            .resources
            .insert("dev".into(), FilePos::new("part.yaml", 6));
        sub.updates.insert("2021-02-01".into(), sub_record);

        let mut fresh = UpdateRecord::default();
        fresh.tasks.insert("ship".into(), leaf("part.yaml", 8));
        sub.updates.insert("2021-03-01".into(), fresh);

        merge_subplan(&mut root, sub, "part");

        let merged = root.updates.get("2021-02-01").unwrap();
        assert!(merged.tasks.contains_key("t1"));
        assert!(merged.tasks.contains_key("part.build"));
        // Later-imported resource wins within the colliding date.
        assert_eq!(
            merged.resources.get("dev"),
            Some(&FilePos::new("part.yaml", 6))
        );

        let fresh_date = root.updates.get("2021-03-01").unwrap();
        assert!(fresh_date.tasks.contains_key("part.ship"));
    }

    #[test]
    fn basename_collision_later_import_wins() {
        let mut root = PlanDef::new("root.yaml");

        let mut first = PlanDef::new(PathBuf::from("a/part.yaml"));
        first.tasks.insert("x".into(), leaf("a/part.yaml", 1));
        merge_subplan(&mut root, first, "part");

        let mut second = PlanDef::new(PathBuf::from("b/part.yaml"));
        second.tasks.insert("y".into(), leaf("b/part.yaml", 2));
        merge_subplan(&mut root, second, "part");

        let group = root.tasks.get("part").unwrap();
        assert!(group.children().unwrap().contains_key("y"));
        assert!(!group.children().unwrap().contains_key("x"));
    }
}
