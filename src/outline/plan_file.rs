//! Outline scanner for plan files
//!
//! Plan files are block-style YAML: nested mappings and sequences of
//! mappings, two-space indentation, sequences indented under their key.
//! The scanner produces the same shape an editor outline does: mapping
//! entries become named nodes, sequence items become indexed container
//! nodes, and items of primitive lists are not represented at all, which
//! is why the `imports` list is re-read from raw text through
//! [`ImportSource`].

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{ImportSource, LineSpan, SymbolError, SymbolNode, SymbolSource};

/// Scalar fields re-read from raw text, bypassing the structural tree.
#[derive(Debug, Default, Deserialize)]
struct ScalarFields {
    #[serde(default)]
    imports: Vec<String>,
}

/// File-backed outline scanner for plan files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanOutline;

impl PlanOutline {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolSource for PlanOutline {
    fn structure(&self, path: &Path) -> Result<Vec<SymbolNode>, SymbolError> {
        let text = fs::read_to_string(path).map_err(|source| SymbolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let nodes = scan_outline(&text);
        if nodes.is_empty() {
            return Err(SymbolError::Malformed {
                path: path.to_path_buf(),
                message: "no structure found".into(),
            });
        }
        Ok(nodes)
    }
}

impl ImportSource for PlanOutline {
    fn import_list(&self, path: &Path) -> Result<Vec<String>, SymbolError> {
        let text = fs::read_to_string(path).map_err(|source| SymbolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let fields: Option<ScalarFields> =
            serde_yaml::from_str(&text).map_err(|e| SymbolError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(fields.unwrap_or_default().imports)
    }
}

/// A significant source line: number, indentation depth, content.
struct RawLine {
    no: u32,
    indent: usize,
    text: String,
}

/// Scans raw text into top-level structural nodes.
pub fn scan_outline(text: &str) -> Vec<SymbolNode> {
    let lines = significant_lines(text);
    let mut pos = 0;
    parse_block(&lines, &mut pos, None)
}

fn significant_lines(text: &str) -> Vec<RawLine> {
    let mut lines = Vec::new();
    for (no, raw) in text.lines().enumerate() {
        let raw = raw.trim_end_matches('\r');
        let stripped = strip_comment(raw);
        let trimmed = stripped.trim();
        if trimmed.is_empty() || trimmed == "---" || trimmed == "..." {
            continue;
        }
        let indent = stripped.len() - stripped.trim_start().len();
        lines.push(RawLine {
            no: no as u32,
            indent,
            text: trimmed.to_string(),
        });
    }
    lines
}

/// Removes a trailing comment: a `#` at line start or preceded by
/// whitespace, outside quotes.
fn strip_comment(line: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut prev_is_space = true;
    for (i, c) in line.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double && prev_is_space => return &line[..i],
            _ => {}
        }
        prev_is_space = c.is_whitespace();
    }
    line
}

/// Parses one block of sibling entries. The first line's indentation fixes
/// the block depth; shallower lines end the block, stray deeper lines are
/// skipped. `parent_indent` is None at the top level.
fn parse_block(lines: &[RawLine], pos: &mut usize, parent_indent: Option<usize>) -> Vec<SymbolNode> {
    let mut nodes = Vec::new();
    let block_indent = match lines.get(*pos) {
        Some(first) if parent_indent.is_none_or(|min| first.indent > min) => first.indent,
        _ => return nodes,
    };
    let mut seq_index = 0usize;

    while let Some(line) = lines.get(*pos) {
        if line.indent < block_indent {
            break;
        }
        if line.indent > block_indent {
            *pos += 1;
            continue;
        }

        if let Some(rest) = sequence_item_rest(&line.text) {
            let start = line.no;
            *pos += 1;
            let mut children = Vec::new();
            if let Some((key, value)) = split_entry(rest) {
                // Inline first entry; its own nested block sits deeper
                // than the item's key column.
                let inline_children = if value.is_empty() {
                    parse_block(lines, pos, Some(block_indent + 2))
                } else {
                    Vec::new()
                };
                let end = inline_children.last().map(|n| n.span.end).unwrap_or(start);
                children.push(SymbolNode {
                    name: key,
                    detail: value,
                    span: LineSpan::new(start, end),
                    children: inline_children,
                });
            }
            children.extend(parse_block(lines, pos, Some(block_indent)));

            // Items of primitive lists carry no entries and are not
            // represented, matching editor outlines.
            if !children.is_empty() {
                let end = children.last().map(|n| n.span.end).unwrap_or(start);
                nodes.push(SymbolNode {
                    name: seq_index.to_string(),
                    detail: String::new(),
                    span: LineSpan::new(start, end),
                    children,
                });
            }
            seq_index += 1;
        } else if let Some((key, value)) = split_entry(&line.text) {
            let start = line.no;
            *pos += 1;
            let children = if value.is_empty() {
                parse_block(lines, pos, Some(block_indent))
            } else {
                Vec::new()
            };
            let end = children.last().map(|n| n.span.end).unwrap_or(start);
            nodes.push(SymbolNode {
                name: key,
                detail: value,
                span: LineSpan::new(start, end),
                children,
            });
        } else {
            // Plain scalar line, nothing to represent.
            *pos += 1;
        }
    }
    nodes
}

fn sequence_item_rest(text: &str) -> Option<&str> {
    if text == "-" {
        Some("")
    } else {
        text.strip_prefix("- ").map(str::trim_start)
    }
}

/// Splits `key: value` / `key:` entries; the separating colon must be
/// followed by whitespace or end the line.
fn split_entry(text: &str) -> Option<(String, String)> {
    for (i, c) in text.char_indices() {
        if c != ':' {
            continue;
        }
        let after = &text[i + 1..];
        if after.is_empty() || after.starts_with(' ') || after.starts_with('\t') {
            let key = text[..i].trim();
            if key.is_empty() {
                return None;
            }
            return Some((unquote(key).to_string(), unquote(after.trim()).to_string()));
        }
    }
    None
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "\
project:
  name: Demo
  start: 2021-01-01
imports:
  - part1.yaml
  - part2.yaml
resources:
  - resource: dev1
    name: Developer One
  - resource: dev2
tasks:
  - task: t1
    name: First task
  - milestone: m1
  - group: phase1
    tasks:
      - task: build
updates:
  - update: 2021-02-01
    tasks:
      - task: t1
        done: 2d
";

    #[test]
    fn top_level_groups_are_found() {
        let nodes = scan_outline(PLAN);
        let names: Vec<_> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["project", "imports", "resources", "tasks", "updates"]
        );
    }

    #[test]
    fn primitive_list_items_are_not_represented() {
        let nodes = scan_outline(PLAN);
        let imports = last_named_for_test(&nodes, "imports");
        assert!(imports.children.is_empty());
    }

    #[test]
    fn resource_items_expose_identifier_and_line() {
        let nodes = scan_outline(PLAN);
        let resources = last_named_for_test(&nodes, "resources");
        assert_eq!(resources.children.len(), 2);

        let first = &resources.children[0];
        let decl = first.child_named("resource").unwrap();
        assert_eq!(decl.detail, "dev1");
        assert_eq!(decl.span.start, 7);
        assert_eq!(first.child_named("name").unwrap().detail, "Developer One");
    }

    #[test]
    fn nested_group_keeps_its_subtree() {
        let nodes = scan_outline(PLAN);
        let tasks = last_named_for_test(&nodes, "tasks");
        assert_eq!(tasks.children.len(), 3);

        let group_item = &tasks.children[2];
        assert_eq!(group_item.child_named("group").unwrap().detail, "phase1");
        assert_eq!(group_item.span.start, 14);

        let sub = group_item.child_named("tasks").unwrap();
        assert_eq!(sub.children.len(), 1);
        assert_eq!(sub.children[0].child_named("task").unwrap().detail, "build");
    }

    #[test]
    fn update_items_carry_date_and_entries() {
        let nodes = scan_outline(PLAN);
        let updates = last_named_for_test(&nodes, "updates");
        let item = &updates.children[0];
        assert_eq!(item.child_named("update").unwrap().detail, "2021-02-01");

        let tasks = item.child_named("tasks").unwrap();
        assert_eq!(tasks.children[0].child_named("task").unwrap().detail, "t1");
    }

    #[test]
    fn comments_and_quotes_are_handled() {
        let text = "\
tasks: # main body
  - task: \"quoted\" # trailing
    name: 'single # not a comment'
";
        let nodes = scan_outline(text);
        let tasks = &nodes[0];
        assert_eq!(tasks.name, "tasks");
        let item = &tasks.children[0];
        assert_eq!(item.child_named("task").unwrap().detail, "quoted");
        assert_eq!(
            item.child_named("name").unwrap().detail,
            "single # not a comment"
        );
    }

    #[test]
    fn values_with_colons_keep_the_first_separator() {
        let (key, value) = split_entry("start: 10:30").unwrap();
        assert_eq!(key, "start");
        assert_eq!(value, "10:30");
        assert!(split_entry("no separator here").is_none());
        assert!(split_entry("http://example.com").is_none());
    }

    fn last_named_for_test<'a>(nodes: &'a [SymbolNode], name: &str) -> &'a SymbolNode {
        super::super::last_named(nodes, name).expect("node present")
    }
}
