//! Catalog records consumed by the fitting core.
//!
//! The catalog is an immutable value built by the caller (usually parsed
//! from RON) and passed by reference into generation, validation and stats.
//! There is no global catalog.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses documents that were already read.

mod modules;
mod ship;
mod systems;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use modules::{ModuleDef, ModuleFamily, VariantTier};
pub use ship::{HullClass, HullDef, HullSlot, ShipSize};
pub use systems::{PrimaryArchetype, ReshapeHints, SecondaryDef, ShapeClass, SlotRatio};

use crate::error::{FitError, Result};
use crate::variants::standard_families;

/// Maximum number of secondary systems in one fit.
pub const MAX_SECONDARIES: usize = 2;

/// Designated affinity of a grid cell or module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SlotType {
    /// Power slot.
    Power,
    /// Ammo slot.
    Ammo,
    /// Utility slot.
    Utility,
}

impl SlotType {
    /// All slot types in placement order.
    pub const ALL: [Self; 3] = [Self::Power, Self::Ammo, Self::Utility];

    /// Lowercase name, used in derived RNG seeds.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Ammo => "ammo",
            Self::Utility => "utility",
        }
    }

    /// Single-character symbol for text rendering.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Power => 'P',
            Self::Ammo => 'A',
            Self::Utility => 'U',
        }
    }
}

/// Complete catalog of fitting data.
///
/// The default catalog is empty apart from the built-in family table, the
/// same value a RON document without `families` parses to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Ship sizes.
    #[serde(default)]
    pub ship_sizes: Vec<ShipSize>,
    /// Primary archetypes.
    #[serde(default)]
    pub primaries: Vec<PrimaryArchetype>,
    /// Secondary systems.
    #[serde(default)]
    pub secondaries: Vec<SecondaryDef>,
    /// Canonical modules, before variant expansion.
    #[serde(default)]
    pub modules: Vec<ModuleDef>,
    /// Fixed hull templates.
    #[serde(default)]
    pub hulls: Vec<HullDef>,
    /// Module families used for variant expansion.
    #[serde(default = "standard_families")]
    pub families: Vec<ModuleFamily>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            ship_sizes: Vec::new(),
            primaries: Vec::new(),
            secondaries: Vec::new(),
            modules: Vec::new(),
            hulls: Vec::new(),
            families: standard_families(),
        }
    }
}

/// A player's system selection for one fit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FitSelection {
    /// Ship size.
    pub size: HullClass,
    /// Primary archetype id.
    pub primary: String,
    /// Secondary system ids, at most [`MAX_SECONDARIES`].
    #[serde(default)]
    pub secondaries: Vec<String>,
}

impl FitSelection {
    /// Create a selection with no secondaries.
    #[must_use]
    pub fn new(size: HullClass, primary: impl Into<String>) -> Self {
        Self {
            size,
            primary: primary.into(),
            secondaries: Vec::new(),
        }
    }

    /// Add a secondary system.
    #[must_use]
    pub fn with_secondary(mut self, id: impl Into<String>) -> Self {
        self.secondaries.push(id.into());
        self
    }
}

impl Catalog {
    /// Parse a catalog from a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| FitError::ParseError {
            what: "catalog",
            message: e.to_string(),
        })
    }

    /// Find a ship size by class.
    #[must_use]
    pub fn ship_size(&self, id: HullClass) -> Option<&ShipSize> {
        self.ship_sizes.iter().find(|s| s.id == id)
    }

    /// Find a primary archetype by id.
    #[must_use]
    pub fn primary(&self, id: &str) -> Option<&PrimaryArchetype> {
        self.primaries.iter().find(|p| p.id == id)
    }

    /// Find a secondary system by id.
    #[must_use]
    pub fn secondary(&self, id: &str) -> Option<&SecondaryDef> {
        self.secondaries.iter().find(|s| s.id == id)
    }

    /// Find a canonical module by id.
    #[must_use]
    pub fn module(&self, id: &str) -> Option<&ModuleDef> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Find a hull template by id.
    #[must_use]
    pub fn hull(&self, id: &str) -> Option<&HullDef> {
        self.hulls.iter().find(|h| h.id == id)
    }

    /// Find a hull template by id, failing for unknown ids.
    ///
    /// # Errors
    /// Returns [`FitError::UnknownHull`] if no hull has this id.
    pub fn require_hull(&self, id: &str) -> Result<&HullDef> {
        self.hull(id).ok_or_else(|| FitError::UnknownHull(id.to_string()))
    }

    /// Find a module family by id.
    #[must_use]
    pub fn family(&self, id: &str) -> Option<&ModuleFamily> {
        self.families.iter().find(|f| f.id == id)
    }

    /// Resolve a selection's ids, returning the secondaries in canonical order.
    ///
    /// # Errors
    /// Returns an error for unknown ids, duplicate secondaries, or more than
    /// [`MAX_SECONDARIES`] secondaries.
    pub fn resolve_secondaries(&self, selection: &FitSelection) -> Result<Vec<&SecondaryDef>> {
        if selection.secondaries.len() > MAX_SECONDARIES {
            return Err(FitError::TooManySecondaries {
                count: selection.secondaries.len(),
                max: MAX_SECONDARIES,
            });
        }

        let mut seen = BTreeSet::new();
        let mut resolved = Vec::with_capacity(selection.secondaries.len());
        for id in &selection.secondaries {
            if !seen.insert(id.as_str()) {
                return Err(FitError::DuplicateSecondary(id.clone()));
            }
            let secondary = self
                .secondary(id)
                .ok_or_else(|| FitError::UnknownSecondary(id.clone()))?;
            resolved.push(secondary);
        }
        resolved.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(resolved)
    }

    /// Resolve the size and primary of a selection.
    pub fn resolve_base(&self, selection: &FitSelection) -> Result<(&ShipSize, &PrimaryArchetype)> {
        let size = self
            .ship_size(selection.size)
            .ok_or(FitError::UnknownShipSize(selection.size))?;
        let primary = self
            .primary(&selection.primary)
            .ok_or_else(|| FitError::UnknownPrimary(selection.primary.clone()))?;
        Ok((size, primary))
    }

    /// Validate internal consistency of the catalog.
    ///
    /// Checks for:
    /// - Duplicate ids within each record list
    /// - Primaries with negative or all-zero ratios
    /// - Modules with empty footprints, no legal rotation or negative bandwidth
    /// - Hull slots outside the hull's grid
    /// - Families without a canonical module or without tiers
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        check_duplicates(
            "ship size",
            self.ship_sizes.iter().map(|s| s.id.tier_name()),
            &mut errors,
        );
        check_duplicates("primary", self.primaries.iter().map(|p| p.id.as_str()), &mut errors);
        check_duplicates(
            "secondary",
            self.secondaries.iter().map(|s| s.id.as_str()),
            &mut errors,
        );
        check_duplicates("module", self.modules.iter().map(|m| m.id.as_str()), &mut errors);
        check_duplicates("hull", self.hulls.iter().map(|h| h.id.as_str()), &mut errors);
        check_duplicates("family", self.families.iter().map(|f| f.id.as_str()), &mut errors);

        for size in &self.ship_sizes {
            if size.rows == 0 || size.cols == 0 {
                errors.push(format!("Ship size '{}' has an empty grid", size.name));
            }
        }

        for primary in &self.primaries {
            let r = primary.ratio;
            if r.power < 0.0 || r.ammo < 0.0 || r.utility < 0.0 {
                errors.push(format!("Primary '{}' has a negative ratio component", primary.id));
            } else if r.total() <= 0.0 {
                errors.push(format!("Primary '{}' has an all-zero ratio", primary.id));
            }
        }

        for module in &self.modules {
            if module.shape.cells.is_empty() {
                errors.push(format!("Module '{}' has an empty shape", module.id));
            }
            if module.shape.rotations.is_empty() {
                errors.push(format!("Module '{}' allows no rotation", module.id));
            }
            if module.bandwidth < 0.0 {
                errors.push(format!("Module '{}' has negative bandwidth", module.id));
            }
        }

        for hull in &self.hulls {
            for slot in &hull.slots {
                if slot.r >= hull.rows || slot.c >= hull.cols {
                    errors.push(format!(
                        "Hull '{}' slot ({}, {}) is outside its {}x{} grid",
                        hull.id, slot.r, slot.c, hull.rows, hull.cols
                    ));
                }
            }
        }

        for family in &self.families {
            if family.tiers.is_empty() {
                errors.push(format!("Family '{}' has no tiers", family.id));
            }
            if self.module(&family.id).is_none() {
                errors.push(format!("Family '{}' has no canonical module", family.id));
            }
        }

        errors
    }
}

fn check_duplicates<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<String>,
) {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(format!("Duplicate {kind} id '{id}'"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ModuleShape;
    use crate::stat_key::{StatBlock, StatKey};

    fn create_test_catalog() -> Catalog {
        Catalog {
            ship_sizes: vec![ShipSize {
                id: HullClass::Frigate,
                name: "Frigate".to_string(),
                rows: 3,
                cols: 3,
                base_stats: StatBlock::from([(StatKey::Hull, 300.0)]),
                bw_limit: Some(60.0),
            }],
            primaries: vec![PrimaryArchetype {
                id: "railgun".to_string(),
                name: "Railgun".to_string(),
                shape_class: ShapeClass::Square,
                ratio: SlotRatio::new(0.5, 0.3, 0.2),
                stats: StatBlock::new(),
                tags: vec!["kinetic".to_string()],
            }],
            secondaries: vec![
                SecondaryDef {
                    id: "sensors".to_string(),
                    name: "Sensors".to_string(),
                    ratio_delta: SlotRatio::new(0.0, 0.0, 0.1),
                    reshape: ReshapeHints::default(),
                    stats: StatBlock::new(),
                    tags: vec![],
                },
                SecondaryDef {
                    id: "armor_plating".to_string(),
                    name: "Armor Plating".to_string(),
                    ratio_delta: SlotRatio::default(),
                    reshape: ReshapeHints::default(),
                    stats: StatBlock::new(),
                    tags: vec![],
                },
                SecondaryDef {
                    id: "magazine".to_string(),
                    name: "Magazine".to_string(),
                    ratio_delta: SlotRatio::default(),
                    reshape: ReshapeHints::default(),
                    stats: StatBlock::new(),
                    tags: vec![],
                },
            ],
            modules: vec![ModuleDef::new(
                "capacitor",
                SlotType::Power,
                ModuleShape::single("single"),
                10.0,
                StatBlock::new(),
            )],
            hulls: vec![],
            families: vec![],
        }
    }

    #[test]
    fn test_lookups() {
        let catalog = create_test_catalog();
        assert!(catalog.ship_size(HullClass::Frigate).is_some());
        assert!(catalog.ship_size(HullClass::Capital).is_none());
        assert!(catalog.primary("railgun").is_some());
        assert!(catalog.module("capacitor").is_some());
        assert!(catalog.module("unknown").is_none());
        assert!(matches!(
            catalog.require_hull("corvette"),
            Err(FitError::UnknownHull(id)) if id == "corvette"
        ));
    }

    #[test]
    fn test_resolve_secondaries_sorted_by_id() {
        let catalog = create_test_catalog();
        let selection = FitSelection::new(HullClass::Frigate, "railgun")
            .with_secondary("sensors")
            .with_secondary("armor_plating");
        let resolved = catalog.resolve_secondaries(&selection).expect("resolves");
        let ids: Vec<&str> = resolved.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["armor_plating", "sensors"]);
    }

    #[test]
    fn test_resolve_rejects_too_many_secondaries() {
        let catalog = create_test_catalog();
        let selection = FitSelection::new(HullClass::Frigate, "railgun")
            .with_secondary("sensors")
            .with_secondary("armor_plating")
            .with_secondary("magazine");
        assert!(matches!(
            catalog.resolve_secondaries(&selection),
            Err(FitError::TooManySecondaries { count: 3, max: 2 })
        ));
    }

    #[test]
    fn test_resolve_rejects_duplicates_and_unknowns() {
        let catalog = create_test_catalog();
        let dup = FitSelection::new(HullClass::Frigate, "railgun")
            .with_secondary("sensors")
            .with_secondary("sensors");
        assert!(matches!(
            catalog.resolve_secondaries(&dup),
            Err(FitError::DuplicateSecondary(_))
        ));

        let unknown = FitSelection::new(HullClass::Frigate, "railgun").with_secondary("cloak");
        assert!(matches!(
            catalog.resolve_secondaries(&unknown),
            Err(FitError::UnknownSecondary(_))
        ));
    }

    #[test]
    fn test_resolve_base_unknown_ids() {
        let catalog = create_test_catalog();
        let bad_size = FitSelection::new(HullClass::Capital, "railgun");
        assert!(matches!(
            catalog.resolve_base(&bad_size),
            Err(FitError::UnknownShipSize(HullClass::Capital))
        ));
        let bad_primary = FitSelection::new(HullClass::Frigate, "laser");
        assert!(matches!(
            catalog.resolve_base(&bad_primary),
            Err(FitError::UnknownPrimary(_))
        ));
    }

    #[test]
    fn test_validate_valid_data() {
        let catalog = create_test_catalog();
        let errors = catalog.validate();
        assert!(errors.is_empty(), "Errors: {:?}", errors);
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut catalog = create_test_catalog();
        catalog.modules.push(catalog.modules[0].clone());
        catalog.hulls.push(HullDef {
            id: "skiff".to_string(),
            name: "Skiff".to_string(),
            size: HullClass::Frigate,
            rows: 2,
            cols: 2,
            slots: vec![HullSlot {
                r: 5,
                c: 0,
                slot: SlotType::Ammo,
            }],
        });
        catalog.primaries[0].ratio = SlotRatio::default();

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate module")));
        assert!(errors.iter().any(|e| e.contains("outside")));
        assert!(errors.iter().any(|e| e.contains("all-zero")));
    }

    #[test]
    fn test_hull_class_ordering() {
        assert!(HullClass::Frigate < HullClass::Destroyer);
        assert!(HullClass::Cruiser < HullClass::Capital);
        assert_eq!(HullClass::Capital.tier_name(), "capital");
    }

    #[test]
    fn test_parse_ron_catalog() {
        let source = r#"(
            ship_sizes: [
                (id: Frigate, name: "Frigate", rows: 3, cols: 3,
                 base_stats: { hull: 300.0 }, bw_limit: Some(60.0)),
            ],
            primaries: [
                (id: "railgun", name: "Railgun", shape_class: long_narrow,
                 ratio: (power: 0.5, ammo: 0.3, utility: 0.2)),
            ],
            modules: [
                (id: "capacitor", name: "Capacitor", slot: Power,
                 shape: (id: "single", cells: [(dr: 0, dc: 0)], size_class: S),
                 stats: { powerOutput: 40.0 }, bandwidth: 10.0),
            ],
        )"#;
        let catalog = Catalog::from_ron_str(source).expect("catalog parses");
        assert_eq!(catalog.ship_sizes[0].base_stats[&StatKey::Hull], 300.0);
        assert_eq!(
            catalog.primary("railgun").map(|p| p.shape_class),
            Some(ShapeClass::LongNarrow)
        );
        assert_eq!(catalog.modules[0].shape.rotations.len(), 4);
        assert!(!catalog.families.is_empty(), "default families are loaded");
    }

    #[test]
    fn test_default_matches_parsed_families() {
        let parsed = Catalog::from_ron_str("(modules: [])").expect("catalog parses");
        assert_eq!(Catalog::default(), parsed);
        assert_eq!(Catalog::default().families, standard_families());
    }

    #[test]
    fn test_parse_ron_catalog_error() {
        let result = Catalog::from_ron_str("(ship_sizes: [oops])");
        assert!(matches!(result, Err(FitError::ParseError { what: "catalog", .. })));
    }
}
