//! Structural integrity checks for loaded or hand-edited layouts.
//!
//! The mutator keeps these properties on its own; this module re-verifies them on
//! layouts that came from disk or other tools.

use crate::catalog::{RoomKind, RoomTypeCatalog};
use crate::graph::LayoutGraph;
use serde::Serialize;
use std::collections::HashSet;

/// How serious an integrity issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The layout breaks a graph invariant.
    Error,
    /// The layout is consistent but probably not what the designer wants.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warning => write!(f, "WARN"),
        }
    }
}

/// A single problem found in a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityIssue {
    pub severity: Severity,
    /// Node the issue is about, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    pub message: String,
}

impl IntegrityIssue {
    fn error(node: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            node: Some(node.to_string()),
            message: message.into(),
        }
    }

    fn warning(node: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            node: node.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Whether any issue is an error.
pub fn has_errors(issues: &[IntegrityIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

/// Check every graph invariant and report what is broken.
pub fn check(graph: &LayoutGraph, catalog: &RoomTypeCatalog) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let kind_of = |name: &str| catalog.kind_of(name).unwrap_or(RoomKind::Unassigned);

    // Index must mirror the node collection exactly.
    let mut seen = HashSet::new();
    for (pos, node) in graph.all_nodes().iter().enumerate() {
        if !seen.insert(node.id.as_str()) {
            issues.push(IntegrityIssue::error(&node.id, "duplicate node id"));
        }
        if graph.index().get(&node.id) != Some(&pos) {
            issues.push(IntegrityIssue::error(&node.id, "id index is stale"));
        }
    }
    if graph.index().len() != graph.len() {
        issues.push(IntegrityIssue::warning(
            None,
            format!(
                "id index has {} entries for {} nodes",
                graph.index().len(),
                graph.len()
            ),
        ));
    }

    let mut connected_bosses = 0;
    let mut entrances = 0;
    for node in graph.all_nodes() {
        let id = node.id.as_str();
        if catalog.get(&node.room_type).is_none() {
            issues.push(IntegrityIssue::error(
                id,
                format!("unknown room type '{}'", node.room_type),
            ));
        }
        let kind = kind_of(&node.room_type);

        for (list, label) in [(&node.parent_ids, "parent"), (&node.child_ids, "child")] {
            let mut unique = HashSet::new();
            for other in list {
                if other == id {
                    issues.push(IntegrityIssue::error(id, format!("{label} edge to itself")));
                }
                if !unique.insert(other.as_str()) {
                    issues.push(IntegrityIssue::error(
                        id,
                        format!("duplicate {label} entry {other}"),
                    ));
                }
                if !graph.contains(other) {
                    issues.push(IntegrityIssue::error(
                        id,
                        format!("dangling {label} reference {other}"),
                    ));
                }
            }
        }

        for child in &node.child_ids {
            if let Some(c) = graph.get_node(child)
                && !c.is_child_of(id)
            {
                issues.push(IntegrityIssue::error(
                    id,
                    format!("child {child} does not list this node as parent"),
                ));
            }
        }
        for parent in &node.parent_ids {
            if let Some(p) = graph.get_node(parent)
                && !p.has_child(id)
            {
                issues.push(IntegrityIssue::error(
                    id,
                    format!("parent {parent} does not list this node as child"),
                ));
            }
        }

        if node.parent_ids.len() > 1 {
            issues.push(IntegrityIssue::error(
                id,
                format!("{} parents (at most one allowed)", node.parent_ids.len()),
            ));
        }
        if kind.is_none() && !node.is_isolated() {
            issues.push(IntegrityIssue::error(id, "unassigned room is connected"));
        }
        if kind.is_entrance() {
            entrances += 1;
            if node.has_parent() {
                issues.push(IntegrityIssue::error(id, "entrance has a parent"));
            }
        }
        if kind.is_boss_room() && node.has_parent() {
            connected_bosses += 1;
        }
        for child in &node.child_ids {
            if graph
                .get_node(child)
                .is_some_and(|c| kind_of(&c.room_type).is_corridor() == kind.is_corridor())
            {
                issues.push(IntegrityIssue::warning(
                    Some(id),
                    format!("edge to {child} does not alternate room and corridor"),
                ));
            }
        }
    }

    if connected_bosses > 1 {
        issues.push(IntegrityIssue {
            severity: Severity::Error,
            node: None,
            message: format!("{connected_bosses} boss rooms are connected (at most one allowed)"),
        });
    }
    if entrances == 0 && !graph.is_empty() {
        issues.push(IntegrityIssue::warning(None, "layout has no entrance"));
    }
    if entrances > 1 {
        issues.push(IntegrityIssue::warning(
            None,
            format!("layout has {entrances} entrances"),
        ));
    }

    issues
}
