//! JSON schema validation and version handling for layout files.

use crate::graph::LayoutGraph;
use anyhow::{Context, Result};

pub const CURRENT_VERSION: &str = "1.0.0";

/// Validate a layout's schema version.
pub fn validate_version(graph: &LayoutGraph) -> Result<()> {
    if graph.version != CURRENT_VERSION {
        anyhow::bail!(
            "layout version mismatch: expected {}, found {}",
            CURRENT_VERSION,
            graph.version
        );
    }
    Ok(())
}

/// Serialize a layout to a pretty-printed JSON string.
pub fn to_json(graph: &LayoutGraph) -> Result<String> {
    serde_json::to_string_pretty(graph).context("failed to serialize layout to JSON")
}

/// Serialize a layout to single-line JSON.
pub fn to_json_compact(graph: &LayoutGraph) -> Result<String> {
    serde_json::to_string(graph).context("failed to serialize layout to JSON")
}

/// Deserialize a layout from a JSON string and rebuild its id index.
pub fn from_json(json: &str) -> Result<LayoutGraph> {
    let mut graph: LayoutGraph =
        serde_json::from_str(json).context("failed to deserialize layout from JSON")?;
    validate_version(&graph)?;
    graph.rebuild_index();
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RoomNode;

    #[test]
    fn test_index_is_not_serialized() {
        let graph = LayoutGraph::from_nodes("t", vec![RoomNode::new("a", "Entrance")]);
        let json = to_json_compact(&graph).unwrap();
        assert!(!json.contains("index"));
        assert!(json.contains("\"room_type\":\"Entrance\""));
    }

    #[test]
    fn test_from_json_rebuilds_index() {
        let graph = LayoutGraph::from_nodes(
            "t",
            vec![RoomNode::new("a", "Entrance"), RoomNode::new("b", "Corridor")],
        );
        let loaded = from_json(&to_json(&graph).unwrap()).unwrap();
        assert_eq!(loaded.index().len(), 2);
        assert_eq!(loaded.get_node("b").unwrap().room_type, "Corridor");
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut graph = LayoutGraph::new("t");
        graph.version = "0.1.0".to_string();
        let json = to_json(&graph).unwrap();
        let err = from_json(&json).unwrap_err();
        assert!(err.to_string().contains("version mismatch"));
    }
}
