//! Primary archetype and secondary system records.

use serde::{Deserialize, Serialize};

use super::SlotType;
use crate::stat_key::StatBlock;

/// Qualitative grid-shape influence of a primary weapon system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeClass {
    /// Fewer rows, more columns.
    LongNarrow,
    /// Extra columns.
    Wide,
    /// Rows and columns normalized to one side length.
    Square,
    /// Base dimensions with carved corners.
    Irregular,
    /// Base dimensions with interior holes near the center.
    CentralPockets,
}

impl ShapeClass {
    /// Catalog name of the shape class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LongNarrow => "long_narrow",
            Self::Wide => "wide",
            Self::Square => "square",
            Self::Irregular => "irregular",
            Self::CentralPockets => "central_pockets",
        }
    }
}

/// Power/Ammo/Utility weights.
///
/// Base ratios are non-negative; secondary deltas may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SlotRatio {
    /// Power weight.
    #[serde(default)]
    pub power: f64,
    /// Ammo weight.
    #[serde(default)]
    pub ammo: f64,
    /// Utility weight.
    #[serde(default)]
    pub utility: f64,
}

impl SlotRatio {
    /// Create a ratio from its three components.
    #[must_use]
    pub const fn new(power: f64, ammo: f64, utility: f64) -> Self {
        Self {
            power,
            ammo,
            utility,
        }
    }

    /// Component for a slot type.
    #[must_use]
    pub const fn get(&self, slot: SlotType) -> f64 {
        match slot {
            SlotType::Power => self.power,
            SlotType::Ammo => self.ammo,
            SlotType::Utility => self.utility,
        }
    }

    /// Sum of all components.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.power + self.ammo + self.utility
    }
}

/// Secondary-system instructions applied after ratio placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReshapeHints {
    /// Extra cells forced to Utility nearest the edges.
    #[serde(default)]
    pub edge_utility: u32,
    /// Extra cells forced to Utility deepest in the interior.
    #[serde(default)]
    pub inner_utility: u32,
    /// Ammo wall preference: negative pulls left, positive pulls right.
    #[serde(default)]
    pub ammo_bias: i32,
}

/// Primary weapon archetype.
///
/// # Example RON
///
/// ```ron
/// PrimaryArchetype(
///     id: "railgun",
///     name: "Railgun",
///     shape_class: long_narrow,
///     ratio: (power: 0.5, ammo: 0.3, utility: 0.2),
///     stats: { damage: 120.0, rateOfFire: 20.0 },
///     tags: ["kinetic"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryArchetype {
    /// Archetype identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Grid-shape influence.
    pub shape_class: ShapeClass,
    /// Base slot ratio.
    pub ratio: SlotRatio,
    /// Base stats contributed by the primary.
    #[serde(default)]
    pub stats: StatBlock,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Secondary system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryDef {
    /// Secondary identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Signed adjustment to the primary ratio.
    #[serde(default)]
    pub ratio_delta: SlotRatio,
    /// Reshape hints.
    #[serde(default)]
    pub reshape: ReshapeHints,
    /// Base stats contributed by the secondary.
    #[serde(default)]
    pub stats: StatBlock,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SecondaryDef {
    /// Check if this secondary has the specified tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl PrimaryArchetype {
    /// Check if this primary has the specified tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
