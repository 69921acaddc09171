//! Ship size and fixed hull records.

use serde::{Deserialize, Serialize};

use super::SlotType;
use crate::stat_key::StatBlock;

/// Hull size class, ordered from smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HullClass {
    /// Smallest hull.
    Frigate,
    /// Second tier.
    Destroyer,
    /// Third tier.
    Cruiser,
    /// Largest hull.
    Capital,
}

impl HullClass {
    /// All hull classes, smallest first.
    pub const ALL: [Self; 4] = [Self::Frigate, Self::Destroyer, Self::Cruiser, Self::Capital];

    /// Lowercase tier name, used as the variant id suffix.
    #[must_use]
    pub const fn tier_name(self) -> &'static str {
        match self {
            Self::Frigate => "frigate",
            Self::Destroyer => "destroyer",
            Self::Cruiser => "cruiser",
            Self::Capital => "capital",
        }
    }
}

/// Ship size catalog record.
///
/// # Example RON
///
/// ```ron
/// ShipSize(
///     id: Frigate,
///     name: "Frigate",
///     rows: 3,
///     cols: 3,
///     base_stats: { hull: 300, speed: 120 },
///     bw_limit: Some(60),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSize {
    /// Size identity.
    pub id: HullClass,
    /// Display name.
    pub name: String,
    /// Base grid rows.
    pub rows: u32,
    /// Base grid columns.
    pub cols: u32,
    /// Stats every ship of this size starts with.
    #[serde(default)]
    pub base_stats: StatBlock,
    /// Explicit bandwidth limit; falls back to the configured table.
    #[serde(default)]
    pub bw_limit: Option<f64>,
}

/// One explicitly typed cell of a fixed hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HullSlot {
    /// Row index.
    pub r: u32,
    /// Column index.
    pub c: u32,
    /// Slot type stamped on the cell.
    pub slot: SlotType,
}

/// A fixed hull template with an explicit slot layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullDef {
    /// Hull identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hull size class.
    pub size: HullClass,
    /// Grid rows.
    pub rows: u32,
    /// Grid columns.
    pub cols: u32,
    /// Typed cells; cells not listed stay empty.
    #[serde(default)]
    pub slots: Vec<HullSlot>,
}
