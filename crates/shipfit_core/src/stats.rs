//! Derived stats and the bandwidth penalty model.
//!
//! Stats are always recomputed from scratch:
//! 1. Base stats of the ship size, primary and secondaries are summed.
//! 2. Every placed module costs `bandwidth * (1 + mismatch)`; the total is
//!    compared with the size's limit and any overage lowers the
//!    responsiveness multiplier `1 / (1 + k_bw * over)`.
//! 3. Placed module stats are summed in.
//! 4. Percentage bonuses reshape their target stats; bonuses with no target
//!    are dropped. Responsiveness then scales tracking and traverse speed.
//! 5. Values are rounded per key and zeros omitted.
//!
//! Missing catalog pieces contribute nothing; there is no failure path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{PrimaryArchetype, SecondaryDef, ShipSize};
use crate::config::BandwidthConfig;
use crate::grid::Grid;
use crate::math::round_places;
use crate::placement::{mismatch_fraction, PlacedModule};
use crate::registry::ModuleRegistry;
use crate::stat_key::{Precision, StatBlock, StatKey, DERIVATION_RULES};

/// Formatted derived stats of a fit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DerivedStats(BTreeMap<StatKey, f64>);

impl DerivedStats {
    /// Value of a stat, if present.
    #[must_use]
    pub fn get(&self, key: StatKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    /// Value of a stat, zero when omitted.
    #[must_use]
    pub fn value(&self, key: StatKey) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    /// Stats in key order.
    pub fn iter(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of reported stats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no stats are reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stats keyed by their external camelCase names.
    #[must_use]
    pub fn to_named_map(&self) -> BTreeMap<&'static str, f64> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}

/// Bandwidth cost of one placed module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleBandwidth {
    /// Index in the placement list.
    pub index: usize,
    /// Module id.
    pub module_id: String,
    /// Base bandwidth cost.
    pub base: f64,
    /// Mismatch fraction in `[0, 1]`.
    pub mismatch: f64,
    /// Scaled cost, `base * (1 + mismatch)`.
    pub cost: f64,
}

/// Bandwidth totals with a per-module breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandwidthReport {
    /// Sum of scaled module costs.
    pub total: f64,
    /// Limit of the ship size.
    pub limit: f64,
    /// Amount above the limit, never negative.
    pub over: f64,
    /// Responsiveness multiplier in `(0, 1]`.
    pub responsiveness: f64,
    /// Mean mismatch over placed modules, zero with none placed.
    pub avg_mismatch: f64,
    /// Per-module costs, in placement order. Unknown modules are omitted.
    pub modules: Vec<ModuleBandwidth>,
}

/// Responsiveness multiplier for a bandwidth overage.
#[must_use]
pub fn responsiveness_multiplier(over: f64, k_bw: f64) -> f64 {
    1.0 / (1.0 + k_bw * over.max(0.0))
}

/// Bandwidth limit of a ship size, zero without one.
#[must_use]
pub fn bandwidth_limit(size: Option<&ShipSize>, config: &BandwidthConfig) -> f64 {
    size.map_or(0.0, |s| {
        s.bw_limit.unwrap_or_else(|| config.fallback_limit(s.id))
    })
}

/// Price every placed module and compare the total with the size's limit.
///
/// Without a grid every module's mismatch is zero.
#[must_use]
pub fn bandwidth_report(
    placed: &[PlacedModule],
    registry: &ModuleRegistry,
    size: Option<&ShipSize>,
    grid: Option<&Grid>,
    config: &BandwidthConfig,
) -> BandwidthReport {
    let modules: Vec<ModuleBandwidth> = placed
        .iter()
        .enumerate()
        .filter_map(|(index, placement)| {
            let module = registry.get(&placement.module_id)?;
            let mismatch = grid.map_or(0.0, |g| mismatch_fraction(g, module, placement));
            Some(ModuleBandwidth {
                index,
                module_id: module.id.clone(),
                base: module.bandwidth,
                mismatch,
                cost: module.bandwidth * (1.0 + mismatch),
            })
        })
        .collect();

    let total: f64 = modules.iter().map(|m| m.cost).sum();
    let limit = bandwidth_limit(size, config);
    let over = (total - limit).max(0.0);
    let avg_mismatch = if modules.is_empty() {
        0.0
    } else {
        modules.iter().map(|m| m.mismatch).sum::<f64>() / modules.len() as f64
    };

    BandwidthReport {
        total,
        limit,
        over,
        responsiveness: responsiveness_multiplier(over, config.k_bw),
        avg_mismatch,
        modules,
    }
}

/// Compute the derived stats of a fit.
#[must_use]
pub fn compute_derived_stats(
    placed: &[PlacedModule],
    registry: &ModuleRegistry,
    size: Option<&ShipSize>,
    primary: Option<&PrimaryArchetype>,
    secondaries: &[&SecondaryDef],
    grid: Option<&Grid>,
    config: &BandwidthConfig,
) -> DerivedStats {
    let mut totals = StatBlock::new();
    if let Some(size) = size {
        add_stats(&mut totals, &size.base_stats);
    }
    if let Some(primary) = primary {
        add_stats(&mut totals, &primary.stats);
    }
    for secondary in secondaries {
        add_stats(&mut totals, &secondary.stats);
    }

    let report = bandwidth_report(placed, registry, size, grid, config);

    for placement in placed {
        if let Some(module) = registry.get(&placement.module_id) {
            add_stats(&mut totals, &module.stats);
        }
    }

    apply_derivation_rules(&mut totals);

    totals.insert(StatKey::BwTotal, report.total);
    totals.insert(StatKey::BwLimit, report.limit);
    totals.insert(StatKey::BwOver, report.over);
    totals.insert(StatKey::ResponsivenessMult, report.responsiveness);
    totals.insert(StatKey::AvgMismatch, report.avg_mismatch);

    let stats = format_stats(&totals);
    tracing::debug!(
        modules = placed.len(),
        bw_total = report.total,
        bw_limit = report.limit,
        responsiveness = report.responsiveness,
        "Derived stats computed"
    );
    stats
}

fn add_stats(totals: &mut StatBlock, stats: &StatBlock) {
    for (key, value) in stats {
        *totals.entry(*key).or_insert(0.0) += value;
    }
}

/// Apply bonus rules in table order; rules sharing a target chain.
fn apply_derivation_rules(totals: &mut StatBlock) {
    for rule in DERIVATION_RULES {
        let Some(bonus) = totals.get(&rule.bonus).copied() else {
            continue;
        };
        match totals.get_mut(&rule.target) {
            Some(target) => *target *= 1.0 + bonus / 100.0,
            None => {
                totals.remove(&rule.bonus);
            }
        }
    }
}

fn format_stats(totals: &StatBlock) -> DerivedStats {
    let formatted = totals
        .iter()
        .filter_map(|(key, value)| {
            let places = match key.precision() {
                Precision::Integer => 0,
                Precision::Tenths => 1,
                Precision::Ratio => 3,
            };
            let rounded = round_places(*value, places);
            (rounded.is_finite() && rounded != 0.0).then_some((*key, rounded))
        })
        .collect();
    DerivedStats(formatted)
}
