//! Connection rules for parent → child edges.
//!
//! Rules are evaluated in a fixed order and the first failing rule decides the
//! rejection reason. Together they keep the layout an in-tree of alternating
//! room and corridor layers with bounded corridor branching.

use crate::catalog::{RoomKind, RoomTypeCatalog};
use crate::graph::{LayoutGraph, RoomNode};
use serde::{Deserialize, Serialize};

/// Why a proposed edge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The edge would point a node at itself.
    SelfLoop,
    /// One of the endpoints has no room type assigned yet.
    UnassignedEndpoint,
    /// The edge already exists.
    DuplicateEdge,
    /// The target is already the source's parent.
    ReverseEdge,
    /// A boss room is already connected somewhere in the graph.
    BossAlreadyConnected,
    /// The target already has a parent.
    TargetHasParent,
    /// Both endpoints are corridors, or neither is.
    CorridorMismatch,
    /// The source already has the maximum number of child corridors.
    CorridorLimit,
    /// Nothing may point into the entrance.
    TargetIsEntrance,
    /// A corridor bridges to exactly one room.
    CorridorAlreadyBridged,
}

impl RejectReason {
    /// Position of the rule in the evaluation order (1-based).
    pub const fn rule(self) -> u8 {
        match self {
            Self::SelfLoop => 1,
            Self::UnassignedEndpoint => 2,
            Self::DuplicateEdge => 3,
            Self::ReverseEdge => 4,
            Self::BossAlreadyConnected => 5,
            Self::TargetHasParent => 6,
            Self::CorridorMismatch => 7,
            Self::CorridorLimit => 8,
            Self::TargetIsEntrance => 9,
            Self::CorridorAlreadyBridged => 10,
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfLoop => write!(f, "a room cannot connect to itself"),
            Self::UnassignedEndpoint => write!(f, "unassigned rooms cannot be connected"),
            Self::DuplicateEdge => write!(f, "rooms are already connected"),
            Self::ReverseEdge => write!(f, "target is already the parent of the source"),
            Self::BossAlreadyConnected => write!(f, "a boss room is already connected"),
            Self::TargetHasParent => write!(f, "target room already has a parent"),
            Self::CorridorMismatch => {
                write!(f, "edges must join a corridor and a non-corridor room")
            }
            Self::CorridorLimit => write!(f, "source has reached its corridor limit"),
            Self::TargetIsEntrance => write!(f, "the entrance cannot have a parent"),
            Self::CorridorAlreadyBridged => {
                write!(f, "corridor already leads to a room")
            }
        }
    }
}

/// Pure evaluator of the connection rules.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionValidator<'a> {
    catalog: &'a RoomTypeCatalog,
    max_child_corridors: usize,
}

impl<'a> ConnectionValidator<'a> {
    /// Create a validator for one catalog and corridor limit.
    pub fn new(catalog: &'a RoomTypeCatalog, max_child_corridors: usize) -> Self {
        Self {
            catalog,
            max_child_corridors,
        }
    }

    /// Child count at which a node stops accepting corridor children.
    pub fn max_child_corridors(&self) -> usize {
        self.max_child_corridors
    }

    /// Kind of a node's type. Names missing from the catalog count as unassigned.
    pub fn kind_of(&self, node: &RoomNode) -> RoomKind {
        self.catalog
            .kind_of(&node.room_type)
            .unwrap_or(RoomKind::Unassigned)
    }

    /// True when some boss room in the graph already has a parent.
    pub fn boss_connected(&self, graph: &LayoutGraph) -> bool {
        graph
            .all_nodes()
            .iter()
            .any(|n| n.has_parent() && self.kind_of(n).is_boss_room())
    }

    /// Decide whether `from → to` may be added. Does not mutate anything.
    pub fn can_connect(
        &self,
        graph: &LayoutGraph,
        from: &RoomNode,
        to: &RoomNode,
    ) -> Result<(), RejectReason> {
        let from_kind = self.kind_of(from);
        let to_kind = self.kind_of(to);

        if to.id == from.id {
            return Err(RejectReason::SelfLoop);
        }
        if to_kind.is_none() || from_kind.is_none() {
            return Err(RejectReason::UnassignedEndpoint);
        }
        if from.has_child(&to.id) {
            return Err(RejectReason::DuplicateEdge);
        }
        if from.is_child_of(&to.id) {
            return Err(RejectReason::ReverseEdge);
        }
        if to_kind.is_boss_room() && self.boss_connected(graph) {
            return Err(RejectReason::BossAlreadyConnected);
        }
        if to.has_parent() {
            return Err(RejectReason::TargetHasParent);
        }
        if from_kind.is_corridor() == to_kind.is_corridor() {
            return Err(RejectReason::CorridorMismatch);
        }
        if to_kind.is_corridor() && from.child_ids.len() >= self.max_child_corridors {
            return Err(RejectReason::CorridorLimit);
        }
        if to_kind.is_entrance() {
            return Err(RejectReason::TargetIsEntrance);
        }
        // `from` is a corridor here (rule 7), and a corridor leads to a single room.
        if !to_kind.is_corridor() && !from.child_ids.is_empty() {
            return Err(RejectReason::CorridorAlreadyBridged);
        }
        Ok(())
    }

    /// Boolean form of [`Self::can_connect`].
    pub fn is_valid(&self, graph: &LayoutGraph, from: &RoomNode, to: &RoomNode) -> bool {
        self.can_connect(graph, from, to).is_ok()
    }
}
