//! Room-type definitions and the catalog that registers them.

use crate::error::CatalogError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Orientation of a corridor type. `Any` is the generic corridor a designer places;
/// the oriented variants are resolved by the dungeon builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorridorOrientation {
    #[default]
    Any,
    NorthSouth,
    EastWest,
}

/// What role a room type plays in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomKind {
    /// The single root of the layout.
    Entrance,
    /// The boss room; connectable at most once per graph.
    Boss,
    /// A bridge between two non-corridor rooms.
    Corridor {
        #[serde(default)]
        orientation: CorridorOrientation,
    },
    /// Any ordinary room.
    Room,
    /// Placeholder for a node whose type has not been chosen yet.
    Unassigned,
}

impl RoomKind {
    /// True for the entrance kind.
    pub const fn is_entrance(self) -> bool {
        matches!(self, Self::Entrance)
    }

    /// True for the boss room kind.
    pub const fn is_boss_room(self) -> bool {
        matches!(self, Self::Boss)
    }

    /// True for corridors of every orientation.
    pub const fn is_corridor(self) -> bool {
        matches!(self, Self::Corridor { .. })
    }

    /// True for a corridor fixed to north-south.
    pub const fn is_corridor_ns(self) -> bool {
        matches!(
            self,
            Self::Corridor {
                orientation: CorridorOrientation::NorthSouth
            }
        )
    }

    /// True for a corridor fixed to east-west.
    pub const fn is_corridor_ew(self) -> bool {
        matches!(
            self,
            Self::Corridor {
                orientation: CorridorOrientation::EastWest
            }
        )
    }

    /// True for the unassigned placeholder.
    pub const fn is_none(self) -> bool {
        matches!(self, Self::Unassigned)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Entrance => "entrance",
            Self::Boss => "boss",
            Self::Corridor { .. } => "corridor",
            Self::Room => "room",
            Self::Unassigned => "unassigned",
        }
    }
}

impl std::fmt::Display for RoomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn default_displayable() -> bool {
    true
}

/// A named room type. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomType {
    pub name: String,
    #[serde(flatten)]
    pub kind: RoomKind,
    /// Whether the type is offered when a designer picks a type for a node.
    #[serde(default = "default_displayable")]
    pub displayable: bool,
}

impl RoomType {
    /// Create a room type.
    pub fn new(name: impl Into<String>, kind: RoomKind, displayable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            displayable,
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    room_type: Vec<RoomType>,
}

/// Registry of every room type available to a layout.
#[derive(Debug, Clone)]
pub struct RoomTypeCatalog {
    types: Vec<RoomType>,
}

impl RoomTypeCatalog {
    /// Build a catalog, checking that it is well formed: non-empty, unique non-empty
    /// names, and exactly one entrance, boss and unassigned type.
    pub fn new(types: Vec<RoomType>) -> std::result::Result<Self, CatalogError> {
        if types.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, ty) in types.iter().enumerate() {
            if ty.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(i));
            }
            if types[..i].iter().any(|other| other.name == ty.name) {
                return Err(CatalogError::DuplicateName(ty.name.clone()));
            }
        }
        let singletons: [(&'static str, fn(RoomKind) -> bool); 3] = [
            ("entrance", RoomKind::is_entrance),
            ("boss", RoomKind::is_boss_room),
            ("unassigned", RoomKind::is_none),
        ];
        for (kind, test) in singletons {
            let found = types.iter().filter(|t| test(t.kind)).count();
            if found != 1 {
                return Err(CatalogError::KindCount { kind, found });
            }
        }
        Ok(Self { types })
    }

    /// The room types shipped with the game.
    pub fn standard() -> Self {
        use CorridorOrientation::{Any, EastWest, NorthSouth};
        let types = vec![
            RoomType::new("Small Room", RoomKind::Room, true),
            RoomType::new("Medium Room", RoomKind::Room, true),
            RoomType::new("Large Room", RoomKind::Room, true),
            RoomType::new("Chest Room", RoomKind::Room, true),
            RoomType::new("Entrance", RoomKind::Entrance, true),
            RoomType::new("Boss Room", RoomKind::Boss, true),
            RoomType::new("Corridor", RoomKind::Corridor { orientation: Any }, true),
            RoomType::new(
                "CorridorNS",
                RoomKind::Corridor {
                    orientation: NorthSouth,
                },
                false,
            ),
            RoomType::new(
                "CorridorEW",
                RoomKind::Corridor {
                    orientation: EastWest,
                },
                false,
            ),
            RoomType::new("None", RoomKind::Unassigned, false),
        ];
        Self { types }
    }

    /// Parse a catalog from TOML `[[room_type]]` tables.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, CatalogError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(file.room_type)
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read room types from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid room type catalog {}", path.display()))
    }

    /// First type matching the predicate, in catalog order.
    pub fn find(&self, predicate: impl Fn(&RoomType) -> bool) -> Option<&RoomType> {
        self.types.iter().find(|t| predicate(t))
    }

    /// Look up a type by exact name.
    pub fn get(&self, name: &str) -> Option<&RoomType> {
        self.find(|t| t.name == name)
    }

    /// Kind of the named type, if the catalog defines it.
    pub fn kind_of(&self, name: &str) -> Option<RoomKind> {
        self.get(name).map(|t| t.kind)
    }

    /// The entrance type.
    pub fn entrance(&self) -> Option<&RoomType> {
        self.find(|t| t.kind.is_entrance())
    }

    /// The boss room type.
    pub fn boss(&self) -> Option<&RoomType> {
        self.find(|t| t.kind.is_boss_room())
    }

    /// The placeholder type for nodes without a type yet.
    pub fn unassigned(&self) -> Option<&RoomType> {
        self.find(|t| t.kind.is_none())
    }

    /// Types offered for selection, in catalog order.
    pub fn displayable_types(&self) -> Vec<&RoomType> {
        self.types.iter().filter(|t| t.displayable).collect()
    }

    /// Every type, hidden ones included, in catalog order.
    pub fn all_types(&self) -> &[RoomType] {
        &self.types
    }
}

impl Default for RoomTypeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_well_formed() {
        let standard = RoomTypeCatalog::standard();
        let rebuilt = RoomTypeCatalog::new(standard.all_types().to_vec());
        assert!(rebuilt.is_ok());
        assert_eq!(standard.entrance().unwrap().name, "Entrance");
        assert_eq!(standard.boss().unwrap().name, "Boss Room");
        assert_eq!(standard.unassigned().unwrap().name, "None");
    }

    #[test]
    fn test_displayable_types_skip_hidden() {
        let catalog = RoomTypeCatalog::standard();
        let names: Vec<&str> = catalog
            .displayable_types()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert!(names.contains(&"Corridor"));
        assert!(!names.contains(&"CorridorNS"));
        assert!(!names.contains(&"None"));
        assert_eq!(names[0], "Small Room");
    }

    #[test]
    fn test_oriented_corridor_flags() {
        let catalog = RoomTypeCatalog::standard();
        let ns = catalog.kind_of("CorridorNS").unwrap();
        assert!(ns.is_corridor());
        assert!(ns.is_corridor_ns());
        assert!(!ns.is_corridor_ew());
        let plain = catalog.kind_of("Corridor").unwrap();
        assert!(plain.is_corridor());
        assert!(!plain.is_corridor_ns());
        assert!(catalog.kind_of("Nope").is_none());
    }

    #[test]
    fn test_rejects_empty_catalog() {
        assert_eq!(RoomTypeCatalog::new(Vec::new()).unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn test_rejects_empty_and_duplicate_names() {
        let types = vec![RoomType::new("  ", RoomKind::Room, true)];
        assert_eq!(
            RoomTypeCatalog::new(types).unwrap_err(),
            CatalogError::EmptyName(0)
        );

        let types = vec![
            RoomType::new("Hall", RoomKind::Room, true),
            RoomType::new("Hall", RoomKind::Room, true),
        ];
        assert_eq!(
            RoomTypeCatalog::new(types).unwrap_err(),
            CatalogError::DuplicateName("Hall".to_string())
        );
    }

    #[test]
    fn test_rejects_missing_boss() {
        let types = vec![
            RoomType::new("Entrance", RoomKind::Entrance, true),
            RoomType::new("None", RoomKind::Unassigned, false),
        ];
        assert_eq!(
            RoomTypeCatalog::new(types).unwrap_err(),
            CatalogError::KindCount {
                kind: "boss",
                found: 0
            }
        );
    }

    #[test]
    fn test_catalog_from_toml() {
        let toml_str = r#"
[[room_type]]
name = "Start"
kind = "entrance"

[[room_type]]
name = "Lair"
kind = "boss"

[[room_type]]
name = "Hall"
kind = "corridor"

[[room_type]]
name = "HallEW"
kind = "corridor"
orientation = "east_west"
displayable = false

[[room_type]]
name = "Cell"
kind = "room"

[[room_type]]
name = "Unset"
kind = "unassigned"
displayable = false
"#;
        let catalog = RoomTypeCatalog::from_toml_str(toml_str).unwrap();
        assert_eq!(catalog.all_types().len(), 6);
        assert_eq!(
            catalog.kind_of("Hall"),
            Some(RoomKind::Corridor {
                orientation: CorridorOrientation::Any
            })
        );
        assert!(catalog.kind_of("HallEW").unwrap().is_corridor_ew());
        assert!(catalog.get("Cell").unwrap().displayable);
        assert_eq!(catalog.displayable_types().len(), 4);
    }

    #[test]
    fn test_catalog_from_toml_reports_parse_errors() {
        let err = RoomTypeCatalog::from_toml_str("[[room_type]]\nname = 3").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
