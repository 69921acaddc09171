//! Tunable parameters for generation and the bandwidth model.
//!
//! Both configs are plain serde data with defaults matching the shipped
//! balance. Callers may load overrides from RON.

use serde::{Deserialize, Serialize};

use crate::catalog::HullClass;
use crate::error::{FitError, Result};

/// Procedural grid generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Smallest allowed row or column count.
    pub min_dim: u32,
    /// Largest allowed row count.
    pub max_rows: u32,
    /// Largest allowed column count.
    pub max_cols: u32,
    /// Columns added for `wide` archetypes.
    pub wide_extra_cols: u32,
    /// Columns added for `long_narrow` archetypes.
    pub long_extra_cols: u32,
    /// Probability that each corner becomes a hole on `irregular` grids.
    pub corner_hole_chance: f64,
    /// Fewest interior pockets carved on `central_pockets` grids.
    pub min_pockets: u32,
    /// Most interior pockets carved on `central_pockets` grids.
    pub max_pockets: u32,
    /// Ammo wall bias is clamped to `[-max_ammo_bias, max_ammo_bias]`.
    pub max_ammo_bias: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_dim: 2,
            max_rows: 8,
            max_cols: 10,
            wide_extra_cols: 1,
            long_extra_cols: 2,
            corner_hole_chance: 0.6,
            min_pockets: 1,
            max_pockets: 2,
            max_ammo_bias: 3,
        }
    }
}

impl GeneratorConfig {
    /// Set the column cap.
    #[must_use]
    pub const fn with_max_cols(mut self, max_cols: u32) -> Self {
        self.max_cols = max_cols;
        self
    }

    /// Set the corner hole probability.
    #[must_use]
    pub fn with_corner_hole_chance(mut self, chance: f64) -> Self {
        self.corner_hole_chance = chance.clamp(0.0, 1.0);
        self
    }
}

/// Bandwidth penalty model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandwidthConfig {
    /// Responsiveness falloff per point of overage.
    pub k_bw: f64,
    /// Limits used when a ship size has no explicit `bw_limit`.
    pub fallback_limits: Vec<(HullClass, f64)>,
}

impl Default for BandwidthConfig {
    fn default() -> Self {
        Self {
            k_bw: 0.01,
            fallback_limits: vec![
                (HullClass::Frigate, 60.0),
                (HullClass::Destroyer, 85.0),
                (HullClass::Cruiser, 110.0),
                (HullClass::Capital, 150.0),
            ],
        }
    }
}

impl BandwidthConfig {
    /// Set the falloff constant.
    #[must_use]
    pub fn with_k_bw(mut self, k_bw: f64) -> Self {
        self.k_bw = k_bw.max(0.0);
        self
    }

    /// Fallback limit for a hull class; zero if the table has no entry.
    #[must_use]
    pub fn fallback_limit(&self, hull: HullClass) -> f64 {
        self.fallback_limits
            .iter()
            .find(|(class, _)| *class == hull)
            .map_or(0.0, |(_, limit)| *limit)
    }
}

/// All tunables in one document.
///
/// # Example RON
///
/// ```ron
/// FitConfig(
///     generator: (corner_hole_chance: 0.5),
///     bandwidth: (k_bw: 0.02),
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Generation parameters.
    pub generator: GeneratorConfig,
    /// Bandwidth parameters.
    pub bandwidth: BandwidthConfig,
}

impl FitConfig {
    /// Parse a config from a RON document. Missing fields keep their defaults.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| FitError::ParseError {
            what: "config",
            message: e.to_string(),
        })
    }
}
