//! Procedural slot grid generation.
//!
//! Generates a typed grid from a primary archetype, up to two secondaries,
//! a ship size and a seed string:
//! - Dimensions adjusted by the archetype's shape class
//! - Corner or central holes that never split the usable area
//! - P/A/U ratio blended with secondary deltas, apportioned to whole cells
//! - Scored cell assignment with seeded tie-breaking
//! - Secondary reshape hints forcing extra Utility cells
//!
//! Generation is a pure function of its inputs. Every random decision is
//! drawn from a [`SeededRng`] keyed by a string derived from the seed, so
//! adding a step never perturbs the streams of the other steps.

use std::collections::BTreeMap;

use crate::catalog::{
    Catalog, FitSelection, PrimaryArchetype, SecondaryDef, ShapeClass, ShipSize, SlotType,
};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::grid::{is_connected, EffectiveRatio, Grid, GridMeta, GridSource};
use crate::math::{to_fixed, Fixed};
use crate::rng::{shuffled, SeededRng};

/// Generate a slot grid.
///
/// Secondaries are blended in id order regardless of the order given, so a
/// selection always produces the same grid.
#[must_use]
pub fn generate_grid(
    primary: &PrimaryArchetype,
    secondaries: &[&SecondaryDef],
    size: &ShipSize,
    seed: &str,
    config: &GeneratorConfig,
) -> Grid {
    let mut secondaries: Vec<&SecondaryDef> = secondaries.to_vec();
    secondaries.sort_by(|a, b| a.id.cmp(&b.id));

    let (rows, cols) = grid_dimensions(primary.shape_class, size, config);
    let mut grid = Grid::blank(rows, cols, GridSource::Seed(seed.to_string()));

    let holes = carve_holes(primary.shape_class, rows, cols, seed, config);
    for (cell, hole) in grid.cells.iter_mut().zip(&holes) {
        cell.hole = *hole;
    }

    let ratio = blend_ratio(primary, &secondaries);
    let usable = grid.usable_count() as u32;
    let counts = apportion(&ratio, usable);

    let ammo_bias = secondaries
        .iter()
        .map(|s| s.reshape.ammo_bias)
        .fold(0i32, i32::saturating_add)
        .clamp(-config.max_ammo_bias.abs(), config.max_ammo_bias.abs());
    assign_slots(&mut grid, counts, ammo_bias, seed);

    let edge_requested: u32 = secondaries.iter().map(|s| s.reshape.edge_utility).sum();
    let inner_requested: u32 = secondaries.iter().map(|s| s.reshape.inner_utility).sum();
    let (edge_utility, inner_utility) =
        reshape(&mut grid, edge_requested, inner_requested, seed);

    grid.meta = GridMeta {
        ratio: Some(ratio),
        counts,
        edge_utility,
        inner_utility,
        ammo_bias,
        holes: grid.hole_count() as u32,
    };

    #[cfg(feature = "debug-validation")]
    {
        assert!(grid.is_connected(), "generated grid is disconnected");
        assert!(grid.cells.iter().all(|c| !(c.hole && c.slot.is_some())));
    }

    tracing::debug!(
        seed,
        primary = %primary.id,
        shape = primary.shape_class.as_str(),
        rows,
        cols,
        holes = grid.meta.holes,
        power = counts[0],
        ammo = counts[1],
        utility = counts[2],
        edge_utility,
        inner_utility,
        "Generated grid"
    );

    grid
}

/// Generate the grid for a catalog selection.
///
/// # Errors
/// Returns an error if the selection names an unknown size, primary or
/// secondary, or has too many secondaries.
pub fn generate_grid_for(
    catalog: &Catalog,
    selection: &FitSelection,
    seed: &str,
    config: &GeneratorConfig,
) -> Result<Grid> {
    let (size, primary) = catalog.resolve_base(selection)?;
    let secondaries = catalog.resolve_secondaries(selection)?;
    Ok(generate_grid(primary, &secondaries, size, seed, config))
}

/// Grid dimensions for a shape class and ship size.
///
/// Extensions never push a dimension past its configured cap, but a base
/// dimension already beyond the cap is kept.
#[must_use]
pub fn grid_dimensions(shape: ShapeClass, size: &ShipSize, config: &GeneratorConfig) -> (u32, u32) {
    let (rows, cols) = (size.rows, size.cols);
    match shape {
        ShapeClass::LongNarrow => (
            rows.saturating_sub(1).max(config.min_dim),
            extend(cols, config.long_extra_cols, config.max_cols),
        ),
        ShapeClass::Wide => (rows, extend(cols, config.wide_extra_cols, config.max_cols)),
        ShapeClass::Square => {
            let lo = config.min_dim + 1;
            let hi = config.max_rows.max(lo);
            let n = (rows + cols).div_ceil(2).clamp(lo, hi);
            (n, n)
        }
        ShapeClass::Irregular | ShapeClass::CentralPockets => (rows, cols),
    }
}

fn extend(base: u32, extra: u32, cap: u32) -> u32 {
    base.saturating_add(extra).min(cap.max(base))
}

/// Carve holes for shape classes that have them.
///
/// A hole is only kept if the remaining usable cells stay 4-connected and at
/// least one usable cell remains.
fn carve_holes(
    shape: ShapeClass,
    rows: u32,
    cols: u32,
    seed: &str,
    config: &GeneratorConfig,
) -> Vec<bool> {
    let mut holes = vec![false; (rows as usize) * (cols as usize)];
    if holes.is_empty() {
        return holes;
    }
    let mut rng = SeededRng::new(&format!("{seed}|carve"));
    let index = |r: u32, c: u32| (r as usize) * (cols as usize) + (c as usize);

    match shape {
        ShapeClass::Irregular => {
            let corners = [
                index(0, 0),
                index(0, cols - 1),
                index(rows - 1, 0),
                index(rows - 1, cols - 1),
            ];
            for idx in corners {
                if rng.chance(config.corner_hole_chance) && !holes[idx] {
                    try_carve(&mut holes, idx, rows, cols);
                }
            }
        }
        ShapeClass::CentralPockets => {
            let lo = config.min_pockets.min(config.max_pockets);
            let span = config.max_pockets.max(lo) - lo + 1;
            let target = lo + rng.next_index(span as usize) as u32;

            let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
            for r in 1..rows.saturating_sub(1) {
                for c in 1..cols.saturating_sub(1) {
                    buckets
                        .entry(power_score(r, c, rows, cols))
                        .or_default()
                        .push(index(r, c));
                }
            }

            let mut carved = 0;
            'buckets: for (bucket, cells) in buckets {
                for idx in shuffled(cells, &format!("{seed}|pocket|{bucket}")) {
                    if carved >= target {
                        break 'buckets;
                    }
                    if try_carve(&mut holes, idx, rows, cols) {
                        carved += 1;
                    }
                }
            }
        }
        ShapeClass::LongNarrow | ShapeClass::Wide | ShapeClass::Square => {}
    }

    holes
}

fn try_carve(holes: &mut [bool], idx: usize, rows: u32, cols: u32) -> bool {
    if holes.iter().filter(|h| !**h).count() <= 1 {
        return false;
    }
    holes[idx] = true;
    if is_connected(rows, cols, holes) {
        true
    } else {
        holes[idx] = false;
        tracing::trace!(idx, "Rejected hole that would disconnect the grid");
        false
    }
}

/// Blend the primary ratio with secondary deltas and normalize.
///
/// Negative components clamp to zero. An all-zero result splits evenly.
#[must_use]
pub fn blend_ratio(primary: &PrimaryArchetype, secondaries: &[&SecondaryDef]) -> EffectiveRatio {
    let [power, ammo, utility] = SlotType::ALL.map(|slot| {
        let delta: Fixed = secondaries
            .iter()
            .map(|s| to_fixed(s.ratio_delta.get(slot)))
            .fold(Fixed::ZERO, Fixed::saturating_add);
        to_fixed(primary.ratio.get(slot))
            .saturating_add(delta)
            .max(Fixed::ZERO)
    });

    let total = power.saturating_add(ammo).saturating_add(utility);
    if total == Fixed::ZERO {
        let third = Fixed::ONE / Fixed::from_num(3);
        return EffectiveRatio {
            power: third,
            ammo: third,
            utility: third,
        };
    }

    EffectiveRatio {
        power: power / total,
        ammo: ammo / total,
        utility: utility / total,
    }
}

/// Largest-remainder apportionment of `total` cells over a ratio.
///
/// Returns `[power, ammo, utility]` summing to `total`. Remainder ties go to
/// the earlier slot type.
#[must_use]
pub fn apportion(ratio: &EffectiveRatio, total: u32) -> [u32; 3] {
    let n = Fixed::from_num(total);
    let quotas = SlotType::ALL.map(|slot| ratio.get(slot).saturating_mul(n));
    let mut counts = quotas.map(|q| q.floor().to_num::<u32>().min(total));
    let remainders = quotas.map(|q| q.frac());

    let mut order = [0usize, 1, 2];
    order.sort_by(|a, b| remainders[*b].cmp(&remainders[*a]).then(a.cmp(b)));

    let assigned: u32 = counts.iter().sum();
    if assigned < total {
        for &i in order.iter().cycle().take((total - assigned) as usize) {
            counts[i] += 1;
        }
    } else {
        let mut excess = assigned - total;
        for &i in order.iter().rev().cycle() {
            if excess == 0 {
                break;
            }
            if counts[i] > 0 {
                counts[i] -= 1;
                excess -= 1;
            }
        }
    }
    counts
}

/// Squared distance to the grid center in doubled coordinates.
fn power_score(r: u32, c: u32, rows: u32, cols: u32) -> i64 {
    let dr = 2 * i64::from(r) - (i64::from(rows) - 1);
    let dc = 2 * i64::from(c) - (i64::from(cols) - 1);
    dr * dr + dc * dc
}

/// Distance to the wall selected by the ammo bias.
fn ammo_score(r: u32, c: u32, rows: u32, cols: u32, bias: i32) -> i64 {
    match bias.signum() {
        -1 => i64::from(c),
        1 => i64::from(cols) - 1 - i64::from(c),
        _ => i64::from(rows) - 1 - i64::from(r),
    }
}

/// Distance to the nearest edge.
fn edge_distance(r: u32, c: u32, rows: u32, cols: u32) -> i64 {
    let r = i64::from(r);
    let c = i64::from(c);
    r.min(c)
        .min(i64::from(rows) - 1 - r)
        .min(i64::from(cols) - 1 - c)
}

fn assign_slots(grid: &mut Grid, counts: [u32; 3], ammo_bias: i32, seed: &str) {
    let (rows, cols) = (grid.rows, grid.cols);
    for (slot, count) in SlotType::ALL.into_iter().zip(counts) {
        let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, cell) in grid.cells.iter().enumerate() {
            if cell.hole || cell.slot.is_some() {
                continue;
            }
            let (r, c) = (cell.row, cell.col);
            let score = match slot {
                SlotType::Power => power_score(r, c, rows, cols),
                SlotType::Ammo => ammo_score(r, c, rows, cols, ammo_bias),
                SlotType::Utility => edge_distance(r, c, rows, cols),
            };
            buckets.entry(score).or_default().push(idx);
        }

        let mut remaining = count as usize;
        for (bucket, cells) in buckets {
            if remaining == 0 {
                break;
            }
            for idx in shuffled(cells, &format!("{seed}|{}|{bucket}", slot.name()))
                .into_iter()
                .take(remaining)
            {
                grid.cells[idx].slot = Some(slot);
                remaining -= 1;
            }
        }
    }
}

/// Force extra cells to Utility; returns the `(edge, inner)` counts applied.
fn reshape(grid: &mut Grid, edge: u32, inner: u32, seed: &str) -> (u32, u32) {
    let applied_edge = force_utility(grid, edge, seed, "edge", false);
    let applied_inner = force_utility(grid, inner, seed, "inner", true);
    (applied_edge, applied_inner)
}

fn force_utility(grid: &mut Grid, count: u32, seed: &str, step: &str, deepest: bool) -> u32 {
    if count == 0 {
        return 0;
    }
    let (rows, cols) = (grid.rows, grid.cols);
    let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, cell) in grid.cells.iter().enumerate() {
        if cell.hole || cell.slot == Some(SlotType::Utility) {
            continue;
        }
        buckets
            .entry(edge_distance(cell.row, cell.col, rows, cols))
            .or_default()
            .push(idx);
    }

    let ordered: Vec<(i64, Vec<usize>)> = if deepest {
        buckets.into_iter().rev().collect()
    } else {
        buckets.into_iter().collect()
    };

    let mut applied = 0;
    for (bucket, cells) in ordered {
        for idx in shuffled(cells, &format!("{seed}|{step}|{bucket}")) {
            if applied >= count {
                return applied;
            }
            grid.cells[idx].slot = Some(SlotType::Utility);
            applied += 1;
        }
    }
    applied
}
