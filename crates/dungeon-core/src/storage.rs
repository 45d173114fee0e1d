//! Read/write layout files from disk.

use crate::config::StorageConfig;
use crate::graph::LayoutGraph;
use crate::schema;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const DUNGEON_DIR: &str = ".dungeon";
const LAYOUTS_DIR: &str = "layouts";
const LAYOUT_EXT: &str = "json";

/// Get the path to the `.dungeon` directory for a given project root.
pub fn dungeon_dir(project_root: &Path) -> PathBuf {
    project_root.join(DUNGEON_DIR)
}

/// Get the directory holding all layout files.
pub fn layout_dir(project_root: &Path) -> PathBuf {
    dungeon_dir(project_root).join(LAYOUTS_DIR)
}

/// Get the path to a named layout file.
pub fn layout_file(project_root: &Path, name: &str) -> PathBuf {
    layout_dir(project_root).join(format!("{name}.{LAYOUT_EXT}"))
}

/// Check if a named layout exists.
pub fn layout_exists(project_root: &Path, name: &str) -> bool {
    layout_file(project_root, name).exists()
}

/// Layout names must be usable as plain file names.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control)
    {
        anyhow::bail!("invalid layout name '{}'", name);
    }
    Ok(())
}

/// Load a layout from disk. The id index is rebuilt before returning.
pub fn load(project_root: &Path, name: &str) -> Result<LayoutGraph> {
    validate_name(name)?;
    let path = layout_file(project_root, name);
    let json = fs::read_to_string(&path)
        .with_context(|| format!("failed to read layout from {}", path.display()))?;
    schema::from_json(&json).with_context(|| format!("invalid layout file {}", path.display()))
}

/// Save a layout to disk under its own name, creating directories if needed.
pub fn save(project_root: &Path, graph: &LayoutGraph, config: &StorageConfig) -> Result<()> {
    validate_name(&graph.name)?;
    let dir = layout_dir(project_root);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create layout directory {}", dir.display()))?;

    let path = layout_file(project_root, &graph.name);
    let json = if config.pretty {
        schema::to_json(graph)?
    } else {
        schema::to_json_compact(graph)?
    };
    fs::write(&path, json)
        .with_context(|| format!("failed to write layout to {}", path.display()))?;

    Ok(())
}

/// Names of all stored layouts, sorted.
pub fn list(project_root: &Path) -> Result<Vec<String>> {
    let dir = layout_dir(project_root);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in
        fs::read_dir(&dir).with_context(|| format!("failed to list {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == LAYOUT_EXT)
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}
