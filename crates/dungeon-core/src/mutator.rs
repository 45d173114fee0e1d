//! Edit operations that keep a layout graph consistent.
//!
//! Every operation runs to completion before returning. Edges are always written
//! and removed on both endpoints together, and removals that cascade from an edit
//! are reported back to the caller.

use crate::catalog::RoomTypeCatalog;
use crate::config::LayoutConfig;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, LayoutGraph, RoomNode};
use crate::validator::{ConnectionValidator, RejectReason};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of a type change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetypeOutcome {
    pub previous_type: String,
    /// Children whose edge to the retyped node was removed.
    pub severed: Vec<String>,
    /// Former parent, when the new type cannot have one.
    pub detached_parent: Option<String>,
}

/// Outcome of a node deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    /// Ids of the nodes removed from the graph.
    pub removed: Vec<String>,
    /// Surviving neighbours whose edge lists changed.
    pub touched: BTreeSet<String>,
    /// Matched entrance nodes that were left in place.
    pub protected: Vec<String>,
}

/// Applies edits to a [`LayoutGraph`] using a fixed catalog and rule configuration.
#[derive(Debug, Clone, Copy)]
pub struct GraphMutator<'a> {
    catalog: &'a RoomTypeCatalog,
    validator: ConnectionValidator<'a>,
}

impl<'a> GraphMutator<'a> {
    /// Create a mutator for one catalog and rule configuration.
    pub fn new(catalog: &'a RoomTypeCatalog, config: &LayoutConfig) -> Self {
        Self {
            catalog,
            validator: ConnectionValidator::new(catalog, config.max_child_corridors),
        }
    }

    /// The connection rules this mutator applies.
    pub fn validator(&self) -> &ConnectionValidator<'a> {
        &self.validator
    }

    /// The catalog node types are checked against.
    pub fn catalog(&self) -> &'a RoomTypeCatalog {
        self.catalog
    }

    /// Create a node of the given type with a fresh id and return the id.
    /// Fails with `EntranceExists` when asked for a second entrance.
    pub fn create_node(&self, graph: &mut LayoutGraph, type_name: &str) -> Result<String> {
        let Some(room_type) = self.catalog.get(type_name) else {
            return Err(GraphError::UnknownRoomType(type_name.to_string()));
        };
        if room_type.kind.is_entrance()
            && let Some(existing) = self.entrance_id(graph)
        {
            return Err(GraphError::EntranceExists(existing.to_string()));
        }
        let node = RoomNode::new(Uuid::new_v4().to_string(), type_name);
        let id = node.id.clone();
        graph.add_node(node).inspect_err(|err| {
            debug_assert!(
                !matches!(err, GraphError::DuplicateId(_)),
                "node id generator produced a collision: {err}"
            );
        })?;
        graph.touch();
        debug!(node = %id, room_type = type_name, "created node");
        Ok(id)
    }

    /// Create a node the way the editor does: the entrance when the graph is empty,
    /// an unassigned placeholder otherwise.
    pub fn create_default_node(&self, graph: &mut LayoutGraph) -> Result<String> {
        let room_type = if graph.is_empty() {
            self.catalog.entrance()
        } else {
            self.catalog.unassigned()
        };
        let name = room_type
            .map(|t| t.name.clone())
            .ok_or_else(|| GraphError::UnknownRoomType("<default>".to_string()))?;
        self.create_node(graph, &name)
    }

    /// Add the edge `from → to` if the connection rules allow it.
    pub fn connect(&self, graph: &mut LayoutGraph, from_id: &str, to_id: &str) -> Result<()> {
        let from = graph
            .get_node(from_id)
            .ok_or_else(|| GraphError::not_found(from_id))?;
        let to = graph
            .get_node(to_id)
            .ok_or_else(|| GraphError::not_found(to_id))?;

        if let Err(reason) = self.validator.can_connect(graph, from, to) {
            debug!(from = from_id, to = to_id, rule = reason.rule(), "connection rejected");
            return Err(GraphError::Rejected {
                from: from_id.to_string(),
                to: to_id.to_string(),
                reason,
            });
        }

        add_edge(graph, from_id, to_id);
        graph.touch();
        debug!(from = from_id, to = to_id, "connected");
        Ok(())
    }

    /// Remove the edge `parent → child`. Returns `false` when there was no such edge.
    ///
    /// Panics if the edge is recorded on only one side; that state can only come
    /// from an earlier bug or a hand-edited file.
    pub fn disconnect_edge(
        &self,
        graph: &mut LayoutGraph,
        parent_id: &str,
        child_id: &str,
    ) -> Result<bool> {
        let parent = graph
            .get_node(parent_id)
            .ok_or_else(|| GraphError::not_found(parent_id))?;
        let child = graph
            .get_node(child_id)
            .ok_or_else(|| GraphError::not_found(child_id))?;

        let forward = parent.has_child(child_id);
        let backward = child.is_child_of(parent_id);
        assert_eq!(
            forward, backward,
            "asymmetric edge {parent_id} -> {child_id} (child list: {forward}, parent list: {backward})"
        );
        if !forward {
            warn!(parent = parent_id, child = child_id, "no edge to disconnect");
            return Ok(false);
        }

        remove_edge(graph, parent_id, child_id);
        graph.touch();
        debug!(parent = parent_id, child = child_id, "disconnected");
        Ok(true)
    }

    /// Change a node's type.
    ///
    /// Turning a corridor into a non-corridor (or back), or turning a node into the
    /// boss room, invalidates its child edges; those are severed and reported. The
    /// parent edge is kept, unless the new type can never be an edge target
    /// (unassigned or entrance), in which case it is dropped as well.
    /// Promoting a node with a parent to boss fails while another boss is connected.
    /// The entrance keeps its kind (`Protected`), and a second entrance is refused
    /// (`EntranceExists`).
    pub fn retype(
        &self,
        graph: &mut LayoutGraph,
        node_id: &str,
        type_name: &str,
    ) -> Result<RetypeOutcome> {
        let new_kind = self
            .catalog
            .kind_of(type_name)
            .ok_or_else(|| GraphError::UnknownRoomType(type_name.to_string()))?;
        let node = graph
            .get_node(node_id)
            .ok_or_else(|| GraphError::not_found(node_id))?;
        let old_kind = self.validator.kind_of(node);
        if old_kind.is_entrance() && !new_kind.is_entrance() {
            warn!(node = node_id, "refusing to retype the entrance");
            return Err(GraphError::Protected(node_id.to_string()));
        }
        if new_kind.is_entrance()
            && !old_kind.is_entrance()
            && let Some(existing) = self.entrance_id(graph)
        {
            return Err(GraphError::EntranceExists(existing.to_string()));
        }

        let becomes_boss = !old_kind.is_boss_room() && new_kind.is_boss_room();
        if becomes_boss
            && let Some(parent) = node.parent_ids.first()
            && self.validator.boss_connected(graph)
        {
            return Err(GraphError::Rejected {
                from: parent.clone(),
                to: node_id.to_string(),
                reason: RejectReason::BossAlreadyConnected,
            });
        }
        let invalidates_children =
            old_kind.is_corridor() != new_kind.is_corridor() || becomes_boss || new_kind.is_none();
        let drops_parent = new_kind.is_none() || new_kind.is_entrance();

        let Some(node) = graph.get_node_mut(node_id) else {
            return Err(GraphError::not_found(node_id));
        };
        let previous_type = std::mem::replace(&mut node.room_type, type_name.to_string());
        let severed = if invalidates_children {
            std::mem::take(&mut node.child_ids)
        } else {
            Vec::new()
        };
        let parents = if drops_parent {
            std::mem::take(&mut node.parent_ids)
        } else {
            Vec::new()
        };

        for child_id in &severed {
            if let Some(child) = graph.get_node_mut(child_id) {
                child.parent_ids.retain(|p| p != node_id);
            }
        }
        for parent_id in &parents {
            if let Some(parent) = graph.get_node_mut(parent_id) {
                parent.child_ids.retain(|c| c != node_id);
            }
        }
        graph.touch();

        if severed.is_empty() && parents.is_empty() {
            debug!(node = node_id, from = %previous_type, to = type_name, "retyped");
        } else {
            info!(
                node = node_id,
                from = %previous_type,
                to = type_name,
                severed = severed.len(),
                detached = parents.len(),
                "retype removed edges"
            );
        }
        Ok(RetypeOutcome {
            previous_type,
            severed,
            detached_parent: parents.into_iter().next(),
        })
    }

    /// Id of the first entrance node, if any.
    fn entrance_id<'g>(&self, graph: &'g LayoutGraph) -> Option<&'g str> {
        graph
            .all_nodes()
            .iter()
            .find(|n| self.validator.kind_of(n).is_entrance())
            .map(|n| n.id.as_str())
    }

    /// Delete one node and every edge touching it. The entrance is protected.
    pub fn delete_node(&self, graph: &mut LayoutGraph, node_id: &str) -> Result<DeleteOutcome> {
        let node = graph
            .get_node(node_id)
            .ok_or_else(|| GraphError::not_found(node_id))?;
        if self.validator.kind_of(node).is_entrance() {
            warn!(node = node_id, "refusing to delete the entrance");
            return Err(GraphError::Protected(node_id.to_string()));
        }

        let touched = detach(graph, node_id);
        graph.remove_node(node_id)?;
        graph.touch();
        info!(node = node_id, touched = touched.len(), "deleted node");
        Ok(DeleteOutcome {
            removed: vec![node_id.to_string()],
            touched,
            protected: Vec::new(),
        })
    }

    /// Delete every node matching the predicate. Entrance nodes are skipped and
    /// reported as protected. All edges are severed before any node is removed.
    pub fn delete_nodes(
        &self,
        graph: &mut LayoutGraph,
        predicate: impl Fn(&RoomNode) -> bool,
    ) -> Result<DeleteOutcome> {
        let mut outcome = DeleteOutcome::default();
        for node in graph.all_nodes().iter().filter(|n| predicate(n)) {
            if self.validator.kind_of(node).is_entrance() {
                outcome.protected.push(node.id.clone());
            } else {
                outcome.removed.push(node.id.clone());
            }
        }

        for id in &outcome.removed {
            outcome.touched.extend(detach(graph, id));
        }
        for id in &outcome.removed {
            graph.remove_node(id)?;
        }
        for id in &outcome.removed {
            outcome.touched.remove(id);
        }

        if !outcome.protected.is_empty() {
            warn!(count = outcome.protected.len(), "skipped protected nodes");
        }
        if !outcome.removed.is_empty() {
            graph.touch();
            info!(removed = outcome.removed.len(), "deleted nodes");
        }
        Ok(outcome)
    }

    /// Remove every edge whose endpoints are both selected. Nodes stay in place.
    pub fn delete_selected_links(
        &self,
        graph: &mut LayoutGraph,
        is_selected: impl Fn(&RoomNode) -> bool,
    ) -> Vec<Edge> {
        let selected: HashSet<&str> = graph
            .all_nodes()
            .iter()
            .filter(|n| is_selected(n))
            .map(|n| n.id.as_str())
            .collect();
        let doomed: Vec<Edge> = graph
            .edges()
            .into_iter()
            .filter(|e| selected.contains(e.parent.as_str()) && selected.contains(e.child.as_str()))
            .collect();

        for edge in &doomed {
            remove_edge(graph, &edge.parent, &edge.child);
        }
        if !doomed.is_empty() {
            graph.touch();
            info!(count = doomed.len(), "deleted selected links");
        }
        doomed
    }
}

fn add_edge(graph: &mut LayoutGraph, parent_id: &str, child_id: &str) {
    if let Some(parent) = graph.get_node_mut(parent_id) {
        parent.child_ids.push(child_id.to_string());
    }
    if let Some(child) = graph.get_node_mut(child_id) {
        child.parent_ids.push(parent_id.to_string());
    }
}

fn remove_edge(graph: &mut LayoutGraph, parent_id: &str, child_id: &str) {
    if let Some(parent) = graph.get_node_mut(parent_id) {
        parent.child_ids.retain(|c| c != child_id);
    }
    if let Some(child) = graph.get_node_mut(child_id) {
        child.parent_ids.retain(|p| p != parent_id);
    }
}

/// Sever every edge of a node in both directions. Returns the neighbours touched.
fn detach(graph: &mut LayoutGraph, node_id: &str) -> BTreeSet<String> {
    let Some(node) = graph.get_node_mut(node_id) else {
        return BTreeSet::new();
    };
    let children = std::mem::take(&mut node.child_ids);
    let parents = std::mem::take(&mut node.parent_ids);

    for child_id in &children {
        if let Some(child) = graph.get_node_mut(child_id) {
            child.parent_ids.retain(|p| p != node_id);
        }
    }
    for parent_id in &parents {
        if let Some(parent) = graph.get_node_mut(parent_id) {
            parent.child_ids.retain(|c| c != node_id);
        }
    }
    children.into_iter().chain(parents).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node_rejects_unknown_type() {
        let catalog = RoomTypeCatalog::standard();
        let mutator = GraphMutator::new(&catalog, &LayoutConfig::default());
        let mut graph = LayoutGraph::new("t");
        let err = mutator.create_node(&mut graph, "Ballroom").unwrap_err();
        assert_eq!(err, GraphError::UnknownRoomType("Ballroom".to_string()));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_create_default_node_starts_with_entrance() {
        let catalog = RoomTypeCatalog::standard();
        let mutator = GraphMutator::new(&catalog, &LayoutConfig::default());
        let mut graph = LayoutGraph::new("t");
        let first = mutator.create_default_node(&mut graph).unwrap();
        let second = mutator.create_default_node(&mut graph).unwrap();
        assert_eq!(graph.get_node(&first).unwrap().room_type, "Entrance");
        assert_eq!(graph.get_node(&second).unwrap().room_type, "None");
        assert_ne!(first, second);
    }

    #[test]
    fn test_detach_reports_both_directions() {
        let mut graph = LayoutGraph::from_nodes(
            "t",
            vec![
                RoomNode::new("r", "Small Room"),
                RoomNode::new("c", "Corridor"),
                RoomNode::new("d", "Corridor"),
            ],
        );
        add_edge(&mut graph, "r", "c");
        add_edge(&mut graph, "r", "d");
        let touched = detach(&mut graph, "r");
        assert_eq!(touched.into_iter().collect::<Vec<_>>(), vec!["c", "d"]);
        assert!(graph.all_nodes().iter().all(RoomNode::is_isolated));
    }

    #[test]
    #[should_panic(expected = "asymmetric edge")]
    fn test_disconnect_panics_on_half_edge() {
        let catalog = RoomTypeCatalog::standard();
        let mutator = GraphMutator::new(&catalog, &LayoutConfig::default());
        let mut graph = LayoutGraph::from_nodes(
            "t",
            vec![RoomNode::new("r", "Small Room"), RoomNode::new("c", "Corridor")],
        );
        graph.get_node_mut("r").unwrap().child_ids.push("c".to_string());
        let _ = mutator.disconnect_edge(&mut graph, "r", "c");
    }
}
