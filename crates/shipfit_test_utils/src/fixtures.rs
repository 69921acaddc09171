//! Test fixtures and helpers.
//!
//! A complete sample catalog and pre-built selections for consistent
//! testing across crates.

use fixed::types::I32F32;
use shipfit_core::catalog::{
    Catalog, FitSelection, HullClass, HullDef, HullSlot, ModuleDef, PrimaryArchetype,
    ReshapeHints, SecondaryDef, ShapeClass, ShipSize, SlotRatio, SlotType,
};
use shipfit_core::registry::ModuleRegistry;
use shipfit_core::shape::{ModuleShape, Offset, Rotation, SizeClass};
use shipfit_core::stat_key::{StatBlock, StatKey};
use shipfit_core::variants::standard_families;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Build a stat block from key/value pairs.
#[must_use]
pub fn stats(pairs: &[(StatKey, f64)]) -> StatBlock {
    pairs.iter().copied().collect()
}

/// Two cells in a row, placeable horizontally or vertically.
#[must_use]
pub fn bar2() -> ModuleShape {
    ModuleShape::new("bar2", vec![Offset::new(0, 0), Offset::new(0, 1)], SizeClass::S)
        .with_rotations(vec![Rotation::R0, Rotation::R90])
}

/// L-shaped tromino, placeable at any rotation.
#[must_use]
pub fn ell3() -> ModuleShape {
    ModuleShape::new(
        "ell3",
        vec![Offset::new(0, 0), Offset::new(1, 0), Offset::new(1, 1)],
        SizeClass::M,
    )
}

/// Create a module with a display name and tags.
#[must_use]
pub fn create_test_module(
    id: &str,
    slot: SlotType,
    shape: ModuleShape,
    bandwidth: f64,
    stats: StatBlock,
) -> ModuleDef {
    let mut module = ModuleDef::new(id, slot, shape, bandwidth, stats);
    module.name = id.replace('_', " ");
    module
}

fn ship_size(id: HullClass, rows: u32, cols: u32, hull: f64, bw_limit: Option<f64>) -> ShipSize {
    ShipSize {
        id,
        name: format!("{id:?}"),
        rows,
        cols,
        base_stats: stats(&[(StatKey::Hull, hull), (StatKey::Speed, 400.0 / f64::from(rows))]),
        bw_limit,
    }
}

fn primary(
    id: &str,
    shape_class: ShapeClass,
    ratio: SlotRatio,
    pairs: &[(StatKey, f64)],
) -> PrimaryArchetype {
    PrimaryArchetype {
        id: id.to_string(),
        name: id.replace('_', " "),
        shape_class,
        ratio,
        stats: stats(pairs),
        tags: vec!["weapon".to_string()],
    }
}

fn secondary(
    id: &str,
    ratio_delta: SlotRatio,
    reshape: ReshapeHints,
    pairs: &[(StatKey, f64)],
) -> SecondaryDef {
    SecondaryDef {
        id: id.to_string(),
        name: id.replace('_', " "),
        ratio_delta,
        reshape,
        stats: stats(pairs),
        tags: Vec::new(),
    }
}

/// Ship sizes for every hull class.
///
/// The frigate carries an explicit bandwidth limit; the others use the
/// configured fallback table.
#[must_use]
pub fn sample_ship_sizes() -> Vec<ShipSize> {
    vec![
        ship_size(HullClass::Frigate, 3, 3, 300.0, Some(60.0)),
        ship_size(HullClass::Destroyer, 4, 5, 550.0, None),
        ship_size(HullClass::Cruiser, 5, 6, 900.0, None),
        ship_size(HullClass::Capital, 6, 8, 1600.0, None),
    ]
}

/// One primary archetype per shape class.
#[must_use]
pub fn sample_primaries() -> Vec<PrimaryArchetype> {
    vec![
        primary(
            "railgun",
            ShapeClass::LongNarrow,
            SlotRatio::new(0.5, 0.3, 0.2),
            &[(StatKey::Damage, 120.0), (StatKey::Range, 900.0), (StatKey::RateOfFire, 20.0)],
        ),
        primary(
            "beam_lance",
            ShapeClass::Wide,
            SlotRatio::new(0.6, 0.1, 0.3),
            &[(StatKey::Damage, 80.0), (StatKey::Range, 600.0), (StatKey::Tracking, 40.0)],
        ),
        primary(
            "missile_rack",
            ShapeClass::Square,
            SlotRatio::new(0.2, 0.6, 0.2),
            &[(StatKey::Damage, 150.0), (StatKey::Range, 1200.0), (StatKey::RateOfFire, 10.0)],
        ),
        primary(
            "flak_battery",
            ShapeClass::Irregular,
            SlotRatio::new(0.3, 0.5, 0.2),
            &[(StatKey::Damage, 40.0), (StatKey::Tracking, 70.0), (StatKey::TraverseSpeed, 50.0)],
        ),
        primary(
            "plasma_core",
            ShapeClass::CentralPockets,
            SlotRatio::new(0.55, 0.15, 0.3),
            &[(StatKey::Damage, 200.0), (StatKey::Range, 400.0)],
        ),
    ]
}

/// Secondary systems covering every reshape hint.
#[must_use]
pub fn sample_secondaries() -> Vec<SecondaryDef> {
    vec![
        secondary(
            "point_defense",
            SlotRatio::new(0.0, 0.05, 0.05),
            ReshapeHints {
                edge_utility: 2,
                ..ReshapeHints::default()
            },
            &[(StatKey::Tracking, 20.0)],
        ),
        secondary(
            "shield_array",
            SlotRatio::new(0.1, -0.1, 0.1),
            ReshapeHints {
                inner_utility: 1,
                ..ReshapeHints::default()
            },
            &[(StatKey::Shield, 250.0)],
        ),
        secondary(
            "autoloader",
            SlotRatio::new(0.0, 0.15, -0.05),
            ReshapeHints {
                ammo_bias: -2,
                ..ReshapeHints::default()
            },
            &[(StatKey::RofBonus, 15.0)],
        ),
        secondary(
            "fire_control",
            SlotRatio::default(),
            ReshapeHints {
                ammo_bias: 1,
                ..ReshapeHints::default()
            },
            &[(StatKey::TrackingBonus, 10.0), (StatKey::SensorRange, 300.0)],
        ),
    ]
}

/// Canonical modules, including the ids the standard families expand.
#[must_use]
pub fn sample_modules() -> Vec<ModuleDef> {
    vec![
        create_test_module(
            "capacitor",
            SlotType::Power,
            ModuleShape::single("single"),
            10.0,
            stats(&[(StatKey::PowerOutput, 40.0)]),
        ),
        create_test_module(
            "reactor",
            SlotType::Power,
            ModuleShape::single("single"),
            14.0,
            stats(&[(StatKey::PowerOutput, 80.0)]),
        ),
        create_test_module(
            "magazine",
            SlotType::Ammo,
            bar2(),
            12.0,
            stats(&[(StatKey::AmmoCapacity, 60.0)]),
        ),
        create_test_module(
            "loader_arm",
            SlotType::Ammo,
            ModuleShape::single("single"),
            8.0,
            stats(&[(StatKey::ReloadBonus, 10.0)]),
        ),
        create_test_module(
            "armor_plate",
            SlotType::Utility,
            ModuleShape::single("single"),
            6.0,
            stats(&[(StatKey::Armor, 100.0)]),
        ),
        create_test_module(
            "shield_projector",
            SlotType::Utility,
            ModuleShape::single("single"),
            12.0,
            stats(&[(StatKey::Shield, 150.0)]),
        ),
        create_test_module(
            "gyro_stabilizer",
            SlotType::Utility,
            ell3(),
            16.0,
            stats(&[(StatKey::TrackingBonus, 20.0), (StatKey::ArcBonus, 10.0)]),
        ),
        create_test_module(
            "sensor_suite",
            SlotType::Utility,
            ModuleShape::single("single"),
            5.0,
            stats(&[(StatKey::SensorRange, 250.0), (StatKey::Signature, -5.0)]),
        ),
    ]
}

/// A fixed 3x3 frigate hull.
///
/// ```text
/// A P A
/// U P U
/// . U .
/// ```
#[must_use]
pub fn sample_hull() -> HullDef {
    let slot = |r, c, slot| HullSlot { r, c, slot };
    HullDef {
        id: "corvette_mk1".to_string(),
        name: "Corvette Mk I".to_string(),
        size: HullClass::Frigate,
        rows: 3,
        cols: 3,
        slots: vec![
            slot(0, 0, SlotType::Ammo),
            slot(0, 1, SlotType::Power),
            slot(0, 2, SlotType::Ammo),
            slot(1, 0, SlotType::Utility),
            slot(1, 1, SlotType::Power),
            slot(1, 2, SlotType::Utility),
            slot(2, 1, SlotType::Utility),
        ],
    }
}

/// Complete sample catalog.
#[must_use]
pub fn sample_catalog() -> Catalog {
    Catalog {
        ship_sizes: sample_ship_sizes(),
        primaries: sample_primaries(),
        secondaries: sample_secondaries(),
        modules: sample_modules(),
        hulls: vec![sample_hull()],
        families: standard_families(),
    }
}

/// Variant-expanded registry of the sample catalog.
#[must_use]
pub fn sample_registry() -> ModuleRegistry {
    ModuleRegistry::from_catalog(&sample_catalog())
}

/// A selection with two secondaries on a cruiser.
#[must_use]
pub fn sample_selection() -> FitSelection {
    FitSelection::new(HullClass::Cruiser, "railgun")
        .with_secondary("point_defense")
        .with_secondary("autoloader")
}

/// Every selection the sample catalog admits with up to one secondary.
#[must_use]
pub fn all_single_secondary_selections() -> Vec<FitSelection> {
    let catalog = sample_catalog();
    let mut selections = Vec::new();
    for size in HullClass::ALL {
        for primary in &catalog.primaries {
            let base = FitSelection::new(size, primary.id.clone());
            selections.push(base.clone());
            for secondary in &catalog.secondaries {
                selections.push(base.clone().with_secondary(secondary.id.clone()));
            }
        }
    }
    selections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog_is_valid() {
        let catalog = sample_catalog();
        let problems = catalog.validate();
        assert!(problems.is_empty(), "sample catalog problems: {problems:?}");
    }

    #[test]
    fn test_sample_registry_expands_families() {
        let registry = sample_registry();
        assert!(registry.contains("armor_plate_capital"));
        assert!(registry.contains("reactor_destroyer"));
        assert!(registry.contains("capacitor"));
        assert!(!registry.contains("armor_plate"));
    }

    #[test]
    fn test_selection_count() {
        // 4 sizes x 5 primaries x (1 + 4 secondaries)
        assert_eq!(all_single_secondary_selections().len(), 100);
    }
}
