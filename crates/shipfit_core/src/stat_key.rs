//! Closed set of stat keys and the bonus derivation table.
//!
//! Catalog records and derived output both key their numbers by [`StatKey`].
//! The serialized names are the camelCase strings consumers display
//! (`rateOfFire`, `rofBonus`, `bwTotal`, ...), so the external key/value
//! output is unchanged by the enum.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stat map used by catalog records. Repeated keys accumulate when summed.
pub type StatBlock = BTreeMap<StatKey, f64>;

/// Every stat the fitting core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    /// Structure points.
    Hull,
    /// Flat damage reduction.
    Armor,
    /// Regenerating shield points.
    Shield,
    /// Crew complement.
    Crew,
    /// Sublight speed.
    Speed,
    /// Reactor output.
    PowerOutput,
    /// Rounds carried.
    AmmoCapacity,
    /// Damage per shot.
    Damage,
    /// Engagement range.
    Range,
    /// Shots per minute.
    RateOfFire,
    /// Target tracking.
    Tracking,
    /// Turret traverse speed.
    TraverseSpeed,
    /// Sensor range.
    SensorRange,
    /// Radar signature.
    Signature,
    /// Percentage bonus to rate of fire.
    RofBonus,
    /// Percentage bonus to reload, applied to rate of fire.
    ReloadBonus,
    /// Percentage bonus to tracking.
    TrackingBonus,
    /// Percentage bonus to firing arc, applied to traverse speed.
    ArcBonus,
    /// Bandwidth consumed by placed modules.
    BwTotal,
    /// Bandwidth available on the ship size.
    BwLimit,
    /// Bandwidth above the limit.
    BwOver,
    /// Responsiveness degradation multiplier.
    ResponsivenessMult,
    /// Mean slot mismatch across placed modules.
    AvgMismatch,
}

/// How a stat value is rounded for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Whole numbers.
    Integer,
    /// One decimal place.
    Tenths,
    /// Three decimal places, for multipliers and fractions.
    Ratio,
}

impl StatKey {
    /// All keys, in output order.
    pub const ALL: [Self; 23] = [
        Self::Hull,
        Self::Armor,
        Self::Shield,
        Self::Crew,
        Self::Speed,
        Self::PowerOutput,
        Self::AmmoCapacity,
        Self::Damage,
        Self::Range,
        Self::RateOfFire,
        Self::Tracking,
        Self::TraverseSpeed,
        Self::SensorRange,
        Self::Signature,
        Self::RofBonus,
        Self::ReloadBonus,
        Self::TrackingBonus,
        Self::ArcBonus,
        Self::BwTotal,
        Self::BwLimit,
        Self::BwOver,
        Self::ResponsivenessMult,
        Self::AvgMismatch,
    ];

    /// External name of the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hull => "hull",
            Self::Armor => "armor",
            Self::Shield => "shield",
            Self::Crew => "crew",
            Self::Speed => "speed",
            Self::PowerOutput => "powerOutput",
            Self::AmmoCapacity => "ammoCapacity",
            Self::Damage => "damage",
            Self::Range => "range",
            Self::RateOfFire => "rateOfFire",
            Self::Tracking => "tracking",
            Self::TraverseSpeed => "traverseSpeed",
            Self::SensorRange => "sensorRange",
            Self::Signature => "signature",
            Self::RofBonus => "rofBonus",
            Self::ReloadBonus => "reloadBonus",
            Self::TrackingBonus => "trackingBonus",
            Self::ArcBonus => "arcBonus",
            Self::BwTotal => "bwTotal",
            Self::BwLimit => "bwLimit",
            Self::BwOver => "bwOver",
            Self::ResponsivenessMult => "responsivenessMult",
            Self::AvgMismatch => "avgMismatch",
        }
    }

    /// Look up a key by its external name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Output rounding for this key.
    #[must_use]
    pub const fn precision(self) -> Precision {
        match self {
            Self::Hull
            | Self::Armor
            | Self::Shield
            | Self::Crew
            | Self::PowerOutput
            | Self::AmmoCapacity
            | Self::BwLimit => Precision::Integer,
            Self::ResponsivenessMult | Self::AvgMismatch => Precision::Ratio,
            _ => Precision::Tenths,
        }
    }

    /// Whether this key is a percentage bonus consumed by a derivation rule.
    #[must_use]
    pub fn is_bonus(self) -> bool {
        DERIVATION_RULES.iter().any(|rule| rule.bonus == self)
    }
}

/// A percentage bonus that multiplicatively reshapes a base stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationRule {
    /// Bonus key read from the totals.
    pub bonus: StatKey,
    /// Base stat scaled by `1 + bonus / 100`.
    pub target: StatKey,
}

/// Bonus rules in application order. Rules sharing a target chain.
pub const DERIVATION_RULES: [DerivationRule; 4] = [
    DerivationRule {
        bonus: StatKey::RofBonus,
        target: StatKey::RateOfFire,
    },
    DerivationRule {
        bonus: StatKey::ReloadBonus,
        target: StatKey::RateOfFire,
    },
    DerivationRule {
        bonus: StatKey::TrackingBonus,
        target: StatKey::Tracking,
    },
    DerivationRule {
        bonus: StatKey::ArcBonus,
        target: StatKey::TraverseSpeed,
    },
];
