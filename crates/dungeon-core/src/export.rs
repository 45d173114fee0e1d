//! Export a layout as DOT (Graphviz) or a Mermaid flowchart.

use crate::catalog::{RoomKind, RoomTypeCatalog};
use crate::graph::LayoutGraph;
use std::fmt::Write;

/// Export format for layout visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Dot,
    Mermaid,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dot" | "graphviz" => Ok(Self::Dot),
            "mermaid" | "md" => Ok(Self::Mermaid),
            other => Err(format!(
                "unknown export format: {other}. Use 'dot' or 'mermaid'."
            )),
        }
    }
}

/// Export the layout in the requested format.
pub fn export(graph: &LayoutGraph, catalog: &RoomTypeCatalog, format: ExportFormat) -> String {
    match format {
        ExportFormat::Dot => export_dot(graph, catalog),
        ExportFormat::Mermaid => export_mermaid(graph, catalog),
    }
}

fn kind_for(catalog: &RoomTypeCatalog, room_type: &str) -> RoomKind {
    catalog.kind_of(room_type).unwrap_or(RoomKind::Unassigned)
}

/// First 8 characters of an id, used as a readable label suffix.
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

fn escape(label: &str) -> String {
    label.replace('"', "'")
}

/// Escape text for a DOT quoted string, keeping distinct ids distinct.
fn dot_id(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Export the layout as a DOT (Graphviz) string.
pub fn export_dot(graph: &LayoutGraph, catalog: &RoomTypeCatalog) -> String {
    let mut out = String::new();
    writeln!(out, "digraph \"{}\" {{", dot_id(&graph.name)).unwrap();
    writeln!(out, "  rankdir=TB;").unwrap();
    writeln!(out, "  node [fontsize=10];").unwrap();
    writeln!(out).unwrap();

    for node in graph.all_nodes() {
        let (shape, color) = match kind_for(catalog, &node.room_type) {
            RoomKind::Entrance => ("house", "#c8f0c8"),
            RoomKind::Boss => ("doubleoctagon", "#f0c0c0"),
            RoomKind::Corridor { .. } => ("ellipse", "#e0e0e0"),
            RoomKind::Room => ("box", "#e0e0ff"),
            RoomKind::Unassigned => ("box", "#ffffff"),
        };
        writeln!(
            out,
            "  \"{}\" [shape={}, style=filled, fillcolor=\"{}\", label=\"{}\\n{}\"];",
            dot_id(&node.id),
            shape,
            color,
            dot_id(&node.room_type),
            dot_id(short_id(&node.id))
        )
        .unwrap();
    }

    writeln!(out).unwrap();

    for edge in graph.edges() {
        writeln!(
            out,
            "  \"{}\" -> \"{}\";",
            dot_id(&edge.parent),
            dot_id(&edge.child)
        )
        .unwrap();
    }

    writeln!(out, "}}").unwrap();
    out
}

/// Export the layout as a Mermaid flowchart.
pub fn export_mermaid(graph: &LayoutGraph, catalog: &RoomTypeCatalog) -> String {
    let mut out = String::new();
    writeln!(out, "flowchart TD").unwrap();

    // Mermaid ids must be plain identifiers, so nodes are numbered by position.
    for (i, node) in graph.all_nodes().iter().enumerate() {
        let label = escape(&node.room_type);
        let shape = match kind_for(catalog, &node.room_type) {
            RoomKind::Entrance => format!("n{i}([\"{label}\"])"),
            RoomKind::Boss => format!("n{i}{{{{\"{label}\"}}}}"),
            RoomKind::Corridor { .. } => format!("n{i}((\"{label}\"))"),
            RoomKind::Room | RoomKind::Unassigned => format!("n{i}[\"{label}\"]"),
        };
        writeln!(out, "    {}", shape).unwrap();
    }

    for edge in graph.edges() {
        let (Some(from), Some(to)) = (
            graph.index().get(&edge.parent),
            graph.index().get(&edge.child),
        ) else {
            continue;
        };
        writeln!(out, "    n{} --> n{}", from, to).unwrap();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RoomNode;

    fn sample() -> LayoutGraph {
        let mut e = RoomNode::new("entrance-0001", "Entrance");
        let mut c = RoomNode::new("corridor-0002", "Corridor");
        let mut b = RoomNode::new("boss-0003", "Boss Room");
        e.child_ids.push(c.id.clone());
        c.parent_ids.push(e.id.clone());
        c.child_ids.push(b.id.clone());
        b.parent_ids.push(c.id.clone());
        LayoutGraph::from_nodes("demo", vec![e, c, b])
    }

    #[test]
    fn test_export_dot() {
        let out = export(&sample(), &RoomTypeCatalog::standard(), ExportFormat::Dot);
        assert!(out.starts_with("digraph \"demo\" {"));
        assert!(out.contains("\"entrance-0001\" [shape=house"));
        assert!(out.contains("\"corridor-0002\" -> \"boss-0003\";"));
        assert!(out.trim_end().ends_with('}'));
    }

    #[test]
    fn test_export_dot_escapes_ids() {
        let mut a = RoomNode::new("a\"b", "Entrance");
        let mut c = RoomNode::new("c\\", "Corridor");
        a.child_ids.push(c.id.clone());
        c.parent_ids.push(a.id.clone());
        let graph = LayoutGraph::from_nodes("edited", vec![a, c]);

        let out = export_dot(&graph, &RoomTypeCatalog::standard());
        assert!(out.contains(r#""a\"b" [shape=house"#));
        assert!(out.contains(r#""a\"b" -> "c\\";"#));
        assert!(out.contains(r#"label="Entrance\na\"b""#));
        assert!(out.contains(r#"label="Corridor\nc\\""#));
        // Every quote left unescaped opens or closes a string.
        for line in out.lines() {
            let bare = line.replace(r"\\", "").replace(r#"\""#, "");
            assert_eq!(bare.matches('"').count() % 2, 0, "{line}");
        }
    }

    #[test]
    fn test_export_mermaid() {
        let out = export(&sample(), &RoomTypeCatalog::standard(), ExportFormat::Mermaid);
        assert!(out.starts_with("flowchart TD"));
        assert!(out.contains("n0([\"Entrance\"])"));
        assert!(out.contains("n2{{\"Boss Room\"}}"));
        assert!(out.contains("n0 --> n1"));
        assert!(out.contains("n1 --> n2"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("graphviz".parse::<ExportFormat>(), Ok(ExportFormat::Dot));
        assert_eq!("mermaid".parse::<ExportFormat>(), Ok(ExportFormat::Mermaid));
        assert!("svg".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("abcdefghijk"), "abcdefgh");
        assert_eq!(short_id("abc"), "abc");
    }
}
