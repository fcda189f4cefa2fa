//! Identifier lookup over a merged plan
//!
//! Queries return *every* place an identifier was touched: the declaration
//! plus every historical update record, so callers can cycle through the
//! full history. Zero matches is an empty result, never an error.

use crate::domain::{FilePos, PlanDef, TaskNode, TaskTree};

/// Resolves a dotted task identifier to all its source positions.
///
/// The dotted path is walked through the task tree one segment at a time;
/// a walk that runs into a missing segment or through a leaf contributes
/// nothing. Groups contribute their own declaration position. Every update
/// record whose task map contains the full dotted identifier as an exact
/// key contributes as well, in update-date order.
pub fn find_task(plan: &PlanDef, dotted_id: &str) -> Vec<FilePos> {
    let mut results = Vec::new();

    let mut current: Option<&TaskNode> = None;
    let mut scope: Option<&TaskTree> = Some(&plan.tasks);
    for segment in dotted_id.split('.') {
        let Some(tree) = scope else {
            current = None;
            break;
        };
        match tree.get(segment) {
            Some(node) => {
                current = Some(node);
                scope = node.children();
            }
            None => {
                current = None;
                break;
            }
        }
    }
    if let Some(node) = current {
        results.push(node.pos().clone());
    }

    for record in plan.updates.values() {
        if let Some(node) = record.tasks.get(dotted_id) {
            results.push(node.pos().clone());
        }
    }

    results
}

/// Resolves a resource identifier to all its source positions: the flat
/// declaration lookup first, then every update record in date order.
pub fn find_resource(plan: &PlanDef, resource_id: &str) -> Vec<FilePos> {
    let mut results = Vec::new();

    if let Some(pos) = plan.resources.get(resource_id) {
        results.push(pos.clone());
    }

    for record in plan.updates.values() {
        if let Some(pos) = record.resources.get(resource_id) {
            results.push(pos.clone());
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use crate::domain::UpdateRecord;

    use super::*;

    fn leaf(line: u32) -> TaskNode {
        TaskNode::Leaf(FilePos::new("plan.yaml", line))
    }

    fn sample_plan() -> PlanDef {
        let mut plan = PlanDef::new("plan.yaml");

        let mut phase1 = TaskTree::new();
        phase1.insert("build".into(), leaf(5));
        plan.tasks.insert(
            "phase1".into(),
            TaskNode::Group {
                pos: FilePos::new("plan.yaml", 3),
                children: phase1,
            },
        );
        plan.tasks.insert("kickoff".into(), leaf(1));

        plan.resources
            .insert("dev1".into(), FilePos::new("plan.yaml", 10));

        let mut feb = UpdateRecord::default();
        feb.tasks.insert("phase1.build".into(), leaf(20));
        feb.resources
            .insert("dev1".into(), FilePos::new("plan.yaml", 21));
        plan.updates.insert("2021-02-01".into(), feb);

        let mut jan = UpdateRecord::default();
        jan.tasks.insert("phase1.build".into(), leaf(15));
        plan.updates.insert("2021-01-01".into(), jan);

        plan
    }

    #[test]
    fn dotted_path_resolves_leaf() {
        let plan = sample_plan();
        let results = find_task(&plan, "kickoff");
        assert_eq!(results, vec![FilePos::new("plan.yaml", 1)]);
    }

    #[test]
    fn group_contributes_its_own_position() {
        let plan = sample_plan();
        let results = find_task(&plan, "phase1");
        assert_eq!(results, vec![FilePos::new("plan.yaml", 3)]);
    }

    #[test]
    fn declaration_first_then_updates_in_date_order() {
        let plan = sample_plan();
        let results = find_task(&plan, "phase1.build");
        assert_eq!(
            results,
            vec![
                FilePos::new("plan.yaml", 5),
                FilePos::new("plan.yaml", 15),
                FilePos::new("plan.yaml", 20),
            ]
        );
    }

    #[test]
    fn missing_segment_contributes_nothing() {
        let plan = sample_plan();
        assert!(find_task(&plan, "phase2.build").is_empty());
        assert!(find_task(&plan, "phase1.missing").is_empty());
        // Walking through a leaf stops the walk as well.
        assert!(find_task(&plan, "kickoff.sub").is_empty());
        assert!(find_task(&plan, "").is_empty());
    }

    #[test]
    fn update_only_identifier_still_resolves() {
        let mut plan = sample_plan();
        let mut record = UpdateRecord::default();
        record.tasks.insert("gone".into(), leaf(30));
        plan.updates.insert("2021-03-01".into(), record);

        assert_eq!(find_task(&plan, "gone"), vec![FilePos::new("plan.yaml", 30)]);
    }

    #[test]
    fn resource_lookup_spans_declaration_and_updates() {
        let plan = sample_plan();
        let results = find_resource(&plan, "dev1");
        assert_eq!(
            results,
            vec![
                FilePos::new("plan.yaml", 10),
                FilePos::new("plan.yaml", 21),
            ]
        );
        assert!(find_resource(&plan, "unknown").is_empty());
    }

    #[test]
    fn queries_are_pure() {
        let plan = sample_plan();
        assert_eq!(find_task(&plan, "phase1.build"), find_task(&plan, "phase1.build"));
        assert_eq!(find_resource(&plan, "dev1"), find_resource(&plan, "dev1"));
    }
}
