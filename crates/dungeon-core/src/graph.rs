//! Graph data model for dungeon layout templates.

use crate::error::{GraphError, Result};
use crate::schema::CURRENT_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single room in the layout: its identity, type and edges.
///
/// `parent_ids` and `child_ids` are public so persistence can rebuild nodes verbatim.
/// Editing code goes through [`crate::mutator::GraphMutator`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNode {
    pub id: String,
    /// Catalog name of the room type.
    pub room_type: String,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    #[serde(default)]
    pub child_ids: Vec<String>,
}

impl RoomNode {
    /// Create an unconnected node.
    pub fn new(id: impl Into<String>, room_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            room_type: room_type.into(),
            parent_ids: Vec::new(),
            child_ids: Vec::new(),
        }
    }

    /// True when the node is the child end of some edge.
    pub fn has_parent(&self) -> bool {
        !self.parent_ids.is_empty()
    }

    /// True when `id` is among the node's children.
    pub fn has_child(&self, id: &str) -> bool {
        self.child_ids.iter().any(|c| c == id)
    }

    /// True when `id` is among the node's parents.
    pub fn is_child_of(&self, id: &str) -> bool {
        self.parent_ids.iter().any(|p| p == id)
    }

    /// True when the node has no edges in either direction.
    pub fn is_isolated(&self) -> bool {
        self.parent_ids.is_empty() && self.child_ids.is_empty()
    }
}

/// A directed parent → child edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub parent: String,
    pub child: String,
}

impl Edge {
    /// Edge from `parent` to `child`.
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

/// A complete layout template: the owned node collection plus a derived id index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutGraph {
    pub version: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Authoritative node collection, in insertion order.
    pub nodes: Vec<RoomNode>,
    /// Node id → position in `nodes`. Never persisted; rebuilt via `rebuild_index()`.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LayoutGraph {
    /// Create a new empty layout.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: CURRENT_VERSION.to_string(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a layout from an already-populated node collection (e.g. a reload).
    pub fn from_nodes(name: impl Into<String>, nodes: Vec<RoomNode>) -> Self {
        let mut graph = Self::new(name);
        graph.nodes = nodes;
        graph.rebuild_index();
        graph
    }

    /// Recompute the id index from the node collection.
    /// Call after bulk edits to `nodes` and after deserialization.
    pub fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            self.index.insert(node.id.clone(), i);
        }
    }

    /// The id index, for consistency checks.
    pub fn index(&self) -> &HashMap<String, usize> {
        &self.index
    }

    /// Look up a node by exact id.
    pub fn get_node(&self, id: &str) -> Option<&RoomNode> {
        let &pos = self.index.get(id)?;
        self.nodes.get(pos).filter(|n| n.id == id)
    }

    /// Look up a node by exact id for editing. Edge lists must be kept symmetric by the caller.
    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut RoomNode> {
        let &pos = self.index.get(id)?;
        self.nodes.get_mut(pos).filter(|n| n.id == id)
    }

    /// Check whether a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }

    /// Insert a node into both the collection and the index.
    pub fn add_node(&mut self, node: RoomNode) -> Result<()> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateId(node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Remove a node from both the collection and the index.
    /// References held by other nodes are left alone; scrub them first.
    pub fn remove_node(&mut self, id: &str) -> Result<RoomNode> {
        let pos = match self.index.get(id) {
            Some(&pos) if self.nodes.get(pos).is_some_and(|n| n.id == id) => pos,
            _ => return Err(GraphError::not_found(id)),
        };
        let node = self.nodes.remove(pos);
        self.index.remove(id);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Ok(node)
    }

    /// All nodes in insertion order.
    pub fn all_nodes(&self) -> &[RoomNode] {
        &self.nodes
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the layout has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every parent → child edge, ordered by parent insertion then child order.
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes
            .iter()
            .flat_map(|n| n.child_ids.iter().map(|c| Edge::new(n.id.clone(), c.clone())))
            .collect()
    }

    /// Resolve a full id or a unique id prefix.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<&str> {
        if prefix.is_empty() {
            return Err(GraphError::not_found(prefix));
        }
        if let Some(node) = self.get_node(prefix) {
            return Ok(&node.id);
        }
        let mut matches = self.nodes.iter().filter(|n| n.id.starts_with(prefix));
        match (matches.next(), matches.count()) {
            (Some(node), 0) => Ok(&node.id),
            (None, _) => Err(GraphError::not_found(prefix)),
            (Some(_), rest) => Err(GraphError::AmbiguousId {
                prefix: prefix.to_string(),
                matches: rest + 1,
            }),
        }
    }

    /// Mark the layout as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
