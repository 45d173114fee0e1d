use dungeon_core::catalog::RoomTypeCatalog;
use dungeon_core::config::{LayoutConfig, StorageConfig};
use dungeon_core::graph::*;
use dungeon_core::mutator::GraphMutator;
use dungeon_core::storage;
use tempfile::TempDir;

fn build_layout(name: &str) -> (LayoutGraph, Vec<String>) {
    let catalog = RoomTypeCatalog::standard();
    let m = GraphMutator::new(&catalog, &LayoutConfig::default());
    let mut graph = LayoutGraph::new(name);
    let e = m.create_default_node(&mut graph).unwrap();
    let c = m.create_node(&mut graph, "Corridor").unwrap();
    let r = m.create_node(&mut graph, "Chest Room").unwrap();
    let spare = m.create_default_node(&mut graph).unwrap();
    m.connect(&mut graph, &e, &c).unwrap();
    m.connect(&mut graph, &c, &r).unwrap();
    (graph, vec![e, c, r, spare])
}

#[test]
fn test_save_and_load_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let (graph, ids) = build_layout("crypt");
    storage::save(root, &graph, &StorageConfig::default()).unwrap();
    assert!(storage::layout_exists(root, "crypt"));

    let loaded = storage::load(root, "crypt").unwrap();
    assert_eq!(loaded.name, "crypt");
    assert_eq!(loaded.nodes, graph.nodes);
    assert_eq!(loaded.node_ids(), ids);
    // Index is derived on load, never read from disk.
    assert_eq!(loaded.index(), graph.index());
    assert_eq!(loaded.get_node(&ids[3]).unwrap().room_type, "None");
    assert_eq!(loaded.edges(), graph.edges());
}

#[test]
fn test_compact_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let (graph, _) = build_layout("compact");
    storage::save(tmp.path(), &graph, &StorageConfig { pretty: false }).unwrap();

    let raw = std::fs::read_to_string(storage::layout_file(tmp.path(), "compact")).unwrap();
    assert_eq!(raw.lines().count(), 1);
    assert_eq!(storage::load(tmp.path(), "compact").unwrap().nodes, graph.nodes);
}

#[test]
fn test_node_records_hold_only_identity_and_edges() {
    let (graph, _) = build_layout("fields");
    let value: serde_json::Value =
        serde_json::from_str(&dungeon_core::schema::to_json(&graph).unwrap()).unwrap();
    let record = value["nodes"][0].as_object().unwrap();
    let mut keys: Vec<&str> = record.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["child_ids", "id", "parent_ids", "room_type"]);
}

#[test]
fn test_layout_exists_false() {
    let tmp = TempDir::new().unwrap();
    assert!(!storage::layout_exists(tmp.path(), "crypt"));
}

#[test]
fn test_load_missing_layout_fails() {
    let tmp = TempDir::new().unwrap();
    let err = storage::load(tmp.path(), "crypt").unwrap_err();
    assert!(err.to_string().contains("failed to read layout"));
}

#[test]
fn test_list_layouts_sorted() {
    let tmp = TempDir::new().unwrap();
    assert!(storage::list(tmp.path()).unwrap().is_empty());

    for name in ["tower", "crypt", "sewer"] {
        let (graph, _) = build_layout(name);
        storage::save(tmp.path(), &graph, &StorageConfig::default()).unwrap();
    }
    std::fs::write(storage::layout_dir(tmp.path()).join("notes.txt"), "x").unwrap();

    assert_eq!(
        storage::list(tmp.path()).unwrap(),
        vec!["crypt", "sewer", "tower"]
    );
}

#[test]
fn test_invalid_layout_names_rejected() {
    let tmp = TempDir::new().unwrap();
    for bad in ["", "../escape", "a/b", ".hidden"] {
        let graph = LayoutGraph::new(bad);
        assert!(
            storage::save(tmp.path(), &graph, &StorageConfig::default()).is_err(),
            "name {bad:?} should be rejected"
        );
    }
}

#[test]
fn test_corrupt_file_reports_path() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(storage::layout_dir(tmp.path())).unwrap();
    std::fs::write(storage::layout_file(tmp.path(), "broken"), "{ not json").unwrap();

    let err = storage::load(tmp.path(), "broken").unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));
}
