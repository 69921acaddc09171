//! Module definitions and size-tiered module families.

use serde::{Deserialize, Serialize};

use super::{HullClass, SlotType};
use crate::shape::ModuleShape;
use crate::stat_key::StatBlock;

/// Data-driven module definition.
///
/// # Example RON
///
/// ```ron
/// ModuleDef(
///     id: "capacitor",
///     name: "Capacitor Bank",
///     slot: Power,
///     shape: ModuleShape(id: "single", cells: [(dr: 0, dc: 0)], size_class: S),
///     stats: { powerOutput: 40.0 },
///     bandwidth: 10.0,
///     tags: ["power"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDef {
    /// Unique module identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Slot type the module is designed for.
    pub slot: SlotType,
    /// Footprint.
    pub shape: ModuleShape,
    /// Stats contributed when placed.
    #[serde(default)]
    pub stats: StatBlock,
    /// Base bandwidth cost before mismatch scaling.
    pub bandwidth: f64,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Family this module is a variant of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Tier of the variant within its family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_tier: Option<HullClass>,
    /// Smallest hull that may mount this module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_hull: Option<HullClass>,
}

impl ModuleDef {
    /// Create a module with no tags or family metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        slot: SlotType,
        shape: ModuleShape,
        bandwidth: f64,
        stats: StatBlock,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            slot,
            shape,
            stats,
            bandwidth,
            tags: Vec::new(),
            family: None,
            variant_tier: None,
            min_hull: None,
        }
    }

    /// Check if this module has the specified tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether a hull of class `hull` may mount this module.
    #[must_use]
    pub fn fits_hull(&self, hull: HullClass) -> bool {
        self.min_hull.map_or(true, |min| min <= hull)
    }
}

/// One size tier of a module family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantTier {
    /// Smallest hull this tier is meant for; also names the tier.
    pub min_hull: HullClass,
    /// Footprint of this tier.
    pub shape: ModuleShape,
    /// Base bandwidth cost of this tier.
    pub bandwidth: f64,
    /// Stats of this tier, replacing the canonical module's stats.
    #[serde(default)]
    pub stats: StatBlock,
}

/// Size-tiered alternate definitions of a canonical module.
///
/// The family id matches the id of the canonical module it expands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleFamily {
    /// Family id, equal to the canonical module id.
    pub id: String,
    /// Tiers, in any order.
    pub tiers: Vec<VariantTier>,
}

impl ModuleFamily {
    /// Tier for an exact hull class.
    #[must_use]
    pub fn tier(&self, hull: HullClass) -> Option<&VariantTier> {
        self.tiers.iter().find(|t| t.min_hull == hull)
    }

    /// Tiers ordered smallest hull first.
    #[must_use]
    pub fn sorted_tiers(&self) -> Vec<&VariantTier> {
        let mut tiers: Vec<&VariantTier> = self.tiers.iter().collect();
        tiers.sort_by_key(|t| t.min_hull);
        tiers
    }
}
