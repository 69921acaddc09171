//! Module families and hull-size variant resolution.
//!
//! A family expands one canonical module into a variant per hull tier. Each
//! variant keeps the canonical module's slot, name and tags and takes its
//! shape, bandwidth and stats from the tier. Variant ids are the canonical
//! id suffixed with the tier name (`shield_projector_cruiser`).

use crate::catalog::{HullClass, ModuleDef, ModuleFamily, VariantTier};
use crate::shape::{ModuleShape, Offset, Rotation, SizeClass};
use crate::stat_key::{StatBlock, StatKey};

/// Variant id for a canonical module id and tier.
#[must_use]
pub fn variant_id(base_id: &str, tier: HullClass) -> String {
    format!("{base_id}_{}", tier.tier_name())
}

/// Expand canonical modules into their size-tiered variants.
///
/// Modules whose id names a family are replaced by one module per tier,
/// smallest hull first. Modules without a family pass through unchanged.
#[must_use]
pub fn resolve_module_variants(modules: &[ModuleDef], families: &[ModuleFamily]) -> Vec<ModuleDef> {
    let mut resolved = Vec::with_capacity(modules.len());
    for module in modules {
        match families.iter().find(|f| f.id == module.id) {
            Some(family) => {
                resolved.extend(
                    family
                        .sorted_tiers()
                        .into_iter()
                        .map(|tier| build_variant(module, &family.id, tier)),
                );
            }
            None => resolved.push(module.clone()),
        }
    }
    resolved
}

/// Select the variant of `module` suited to `hull`.
///
/// Picks the highest tier whose minimum hull does not exceed `hull`. Works
/// for canonical modules and for variants of another tier. Returns the
/// module unchanged when it has no family or no tier is eligible.
#[must_use]
pub fn select_variant_for_hull(
    module: &ModuleDef,
    hull: HullClass,
    families: &[ModuleFamily],
) -> ModuleDef {
    let family_id = module.family.as_deref().unwrap_or(&module.id);
    let Some(family) = families.iter().find(|f| f.id == family_id) else {
        return module.clone();
    };

    match select_tier_for_hull(family, hull) {
        Some(tier) => build_variant(module, family_id, tier),
        None => module.clone(),
    }
}

/// Highest tier of `family` whose minimum hull does not exceed `hull`.
#[must_use]
pub fn select_tier_for_hull(family: &ModuleFamily, hull: HullClass) -> Option<&VariantTier> {
    family
        .sorted_tiers()
        .into_iter()
        .rev()
        .find(|t| t.min_hull <= hull)
}

fn build_variant(base: &ModuleDef, family_id: &str, tier: &VariantTier) -> ModuleDef {
    ModuleDef {
        id: variant_id(family_id, tier.min_hull),
        name: base.name.clone(),
        slot: base.slot,
        shape: tier.shape.clone(),
        stats: tier.stats.clone(),
        bandwidth: tier.bandwidth,
        tags: base.tags.clone(),
        family: Some(family_id.to_string()),
        variant_tier: Some(tier.min_hull),
        min_hull: Some(tier.min_hull),
    }
}

fn bar(len: i32, size_class: SizeClass) -> ModuleShape {
    ModuleShape::new(
        format!("bar{len}"),
        (0..len).map(|dc| Offset::new(0, dc)).collect(),
        size_class,
    )
    .with_rotations(vec![Rotation::R0, Rotation::R90])
}

fn square2() -> ModuleShape {
    ModuleShape::new(
        "square2",
        vec![
            Offset::new(0, 0),
            Offset::new(0, 1),
            Offset::new(1, 0),
            Offset::new(1, 1),
        ],
        SizeClass::L,
    )
    .with_rotations(vec![Rotation::R0])
}

fn tier(
    min_hull: HullClass,
    shape: ModuleShape,
    bandwidth: f64,
    stats: &[(StatKey, f64)],
) -> VariantTier {
    VariantTier {
        min_hull,
        shape,
        bandwidth,
        stats: stats.iter().copied().collect::<StatBlock>(),
    }
}

/// Built-in family table, used when a catalog does not list its own.
///
/// Covers the scaling defensive and reactor modules.
#[must_use]
pub fn standard_families() -> Vec<ModuleFamily> {
    vec![
        ModuleFamily {
            id: "armor_plate".to_string(),
            tiers: vec![
                tier(
                    HullClass::Frigate,
                    ModuleShape::single("single"),
                    6.0,
                    &[(StatKey::Armor, 40.0), (StatKey::Speed, -2.0)],
                ),
                tier(
                    HullClass::Destroyer,
                    bar(2, SizeClass::M),
                    10.0,
                    &[(StatKey::Armor, 90.0), (StatKey::Speed, -4.0)],
                ),
                tier(
                    HullClass::Cruiser,
                    bar(3, SizeClass::M),
                    14.0,
                    &[(StatKey::Armor, 150.0), (StatKey::Speed, -6.0)],
                ),
                tier(
                    HullClass::Capital,
                    square2(),
                    18.0,
                    &[(StatKey::Armor, 240.0), (StatKey::Speed, -8.0)],
                ),
            ],
        },
        ModuleFamily {
            id: "shield_projector".to_string(),
            tiers: vec![
                tier(
                    HullClass::Frigate,
                    ModuleShape::single("single"),
                    8.0,
                    &[(StatKey::Shield, 60.0)],
                ),
                tier(
                    HullClass::Cruiser,
                    bar(2, SizeClass::M),
                    14.0,
                    &[(StatKey::Shield, 160.0)],
                ),
                tier(HullClass::Capital, square2(), 22.0, &[(StatKey::Shield, 320.0)]),
            ],
        },
        ModuleFamily {
            id: "reactor".to_string(),
            tiers: vec![
                tier(
                    HullClass::Destroyer,
                    bar(2, SizeClass::M),
                    12.0,
                    &[(StatKey::PowerOutput, 80.0)],
                ),
                tier(
                    HullClass::Capital,
                    square2(),
                    20.0,
                    &[(StatKey::PowerOutput, 200.0)],
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SlotType;

    fn canonical(id: &str) -> ModuleDef {
        let mut module = ModuleDef::new(
            id,
            SlotType::Utility,
            ModuleShape::single("single"),
            5.0,
            StatBlock::new(),
        );
        module.tags = vec!["defense".to_string()];
        module
    }

    #[test]
    fn test_expand_family() {
        let families = standard_families();
        let modules = vec![canonical("armor_plate"), canonical("sensor_suite")];
        let resolved = resolve_module_variants(&modules, &families);

        let ids: Vec<&str> = resolved.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "armor_plate_frigate",
                "armor_plate_destroyer",
                "armor_plate_cruiser",
                "armor_plate_capital",
                "sensor_suite",
            ]
        );

        let cruiser = &resolved[2];
        assert_eq!(cruiser.family.as_deref(), Some("armor_plate"));
        assert_eq!(cruiser.variant_tier, Some(HullClass::Cruiser));
        assert_eq!(cruiser.min_hull, Some(HullClass::Cruiser));
        assert_eq!(cruiser.shape.cell_count(), 3);
        assert_eq!(cruiser.slot, SlotType::Utility);
        assert!(cruiser.has_tag("defense"));
        assert_eq!(resolved[4], modules[1]);
    }

    #[test]
    fn test_select_highest_eligible_tier() {
        let families = standard_families();
        let shield = canonical("shield_projector");

        // No destroyer tier: a destroyer gets the frigate variant.
        let picked = select_variant_for_hull(&shield, HullClass::Destroyer, &families);
        assert_eq!(picked.id, "shield_projector_frigate");

        let picked = select_variant_for_hull(&shield, HullClass::Capital, &families);
        assert_eq!(picked.id, "shield_projector_capital");
        assert!((picked.bandwidth - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reselect_from_variant() {
        let families = standard_families();
        let expanded = resolve_module_variants(&[canonical("armor_plate")], &families);
        let capital = &expanded[3];
        let picked = select_variant_for_hull(capital, HullClass::Frigate, &families);
        assert_eq!(picked.id, "armor_plate_frigate");
    }

    #[test]
    fn test_no_family_or_no_eligible_tier() {
        let families = standard_families();
        let plain = canonical("sensor_suite");
        assert_eq!(select_variant_for_hull(&plain, HullClass::Capital, &families), plain);

        // Reactor starts at destroyer.
        let reactor = canonical("reactor");
        assert_eq!(
            select_variant_for_hull(&reactor, HullClass::Frigate, &families),
            reactor
        );
    }

    #[test]
    fn test_tiers_sorted_regardless_of_declaration_order() {
        let mut families = standard_families();
        families[0].tiers.reverse();
        let resolved = resolve_module_variants(&[canonical("armor_plate")], &families);
        assert_eq!(resolved[0].id, "armor_plate_frigate");
        assert_eq!(resolved[3].id, "armor_plate_capital");
    }
}
