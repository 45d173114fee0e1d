//! Error types for layout graph operations.

use crate::validator::RejectReason;

/// Errors returned by graph lookups and mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A referenced node id is not in the graph.
    #[error("node not found: {0}")]
    NotFound(String),
    /// A node with this id is already present.
    #[error("duplicate node id: {0}")]
    DuplicateId(String),
    /// An id prefix matched more than one node.
    #[error("ambiguous node id prefix '{prefix}' matches {matches} nodes")]
    AmbiguousId { prefix: String, matches: usize },
    /// A type name that the catalog does not define.
    #[error("unknown room type: {0}")]
    UnknownRoomType(String),
    /// The connection rules refused the edge.
    #[error("cannot connect {from} -> {to}: {reason} (rule {})", .reason.rule())]
    Rejected {
        from: String,
        to: String,
        reason: RejectReason,
    },
    /// The entrance node cannot be deleted or given another type.
    #[error("node {0} is the entrance and cannot be deleted or retyped")]
    Protected(String),
    /// The layout already has its entrance.
    #[error("layout already has an entrance: {0}")]
    EntranceExists(String),
}

impl GraphError {
    /// Create a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// The rejection reason, if this error came from the connection rules.
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while building or loading a room-type catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("room type catalog has no entries")]
    Empty,
    #[error("room type at position {0} has an empty name")]
    EmptyName(usize),
    #[error("room type name '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("catalog must define exactly one {kind} type, found {found}")]
    KindCount { kind: &'static str, found: usize },
    #[error("failed to parse catalog: {0}")]
    Parse(String),
}
