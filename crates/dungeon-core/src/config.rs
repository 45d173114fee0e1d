//! Configuration for layout rules, room-type catalog and storage.
//!
//! Load order: `.dungeon/config.toml` → environment variables → defaults.

use crate::catalog::RoomTypeCatalog;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub layout: LayoutConfig,
    pub catalog: CatalogConfig,
    pub storage: StorageConfig,
}

/// Structural limits applied by the connection rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum number of corridors that may branch off a single room.
    pub max_child_corridors: usize,
}

/// Where room types come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// TOML catalog file, relative to the project root.
    /// The built-in catalog is used when unset.
    pub path: Option<PathBuf>,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Pretty-print layout JSON.
    pub pretty: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_child_corridors: 3,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl DungeonConfig {
    /// Load config from `.dungeon/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".dungeon").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override(
            "DUNGEON_MAX_CHILD_CORRIDORS",
            &mut config.layout.max_child_corridors,
        );

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the connection rules cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.layout.max_child_corridors == 0 {
            anyhow::bail!("max_child_corridors must be at least 1");
        }
        Ok(())
    }

    /// Load the configured catalog, or the built-in one.
    pub fn load_catalog(&self, project_root: &Path) -> Result<RoomTypeCatalog> {
        match &self.catalog.path {
            Some(path) => RoomTypeCatalog::load(&project_root.join(path)),
            None => Ok(RoomTypeCatalog::standard()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DungeonConfig::default();
        assert_eq!(config.layout.max_child_corridors, 3);
        assert!(config.catalog.path.is_none());
        assert!(config.storage.pretty);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[layout]
max_child_corridors = 2

[catalog]
path = "rooms.toml"
"#;
        let config: DungeonConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.layout.max_child_corridors, 2);
        assert_eq!(config.catalog.path, Some(PathBuf::from("rooms.toml")));
        // Defaults for unspecified fields
        assert!(config.storage.pretty);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let config = DungeonConfig::load(Path::new("/nonexistent/path")).unwrap();
        assert!(config.layout.max_child_corridors >= 1);
    }

    #[test]
    fn test_zero_corridor_limit_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".dungeon");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "[layout]\nmax_child_corridors = 0\n",
        )
        .unwrap();

        let err = DungeonConfig::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("max_child_corridors"));
    }

    #[test]
    fn test_load_catalog_from_configured_path() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("rooms.toml"),
            r#"
[[room_type]]
name = "Gate"
kind = "entrance"

[[room_type]]
name = "Throne"
kind = "boss"

[[room_type]]
name = "Blank"
kind = "unassigned"
"#,
        )
        .unwrap();

        let mut config = DungeonConfig::default();
        config.catalog.path = Some(PathBuf::from("rooms.toml"));
        let catalog = config.load_catalog(tmp.path()).unwrap();
        assert_eq!(catalog.entrance().unwrap().name, "Gate");

        let fallback = DungeonConfig::default().load_catalog(tmp.path()).unwrap();
        assert_eq!(fallback.entrance().unwrap().name, "Entrance");
    }
}
