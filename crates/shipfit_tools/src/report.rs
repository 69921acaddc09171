//! Text and RON rendering of grids, stats and bandwidth reports.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use shipfit_core::catalog::{FitSelection, HullClass};
use shipfit_core::grid::{Grid, GridSource};
use shipfit_core::placement::{occupancy, PlacedModule};
use shipfit_core::registry::ModuleRegistry;
use shipfit_core::stats::{BandwidthReport, DerivedStats};

use crate::validate::{ToolError, ToolResult};

/// Parse a hull class from its lowercase tier name.
///
/// # Errors
///
/// Returns [`ToolError::Argument`] for unknown names.
pub fn parse_hull_class(name: &str) -> ToolResult<HullClass> {
    HullClass::ALL
        .into_iter()
        .find(|h| h.tier_name().eq_ignore_ascii_case(name))
        .ok_or_else(|| ToolError::Argument(format!("unknown hull class '{name}'")))
}

/// Render a grid with a one-line header.
///
/// ```text
/// seed "alpha" 4x8, holes 0, P/A/U 16/10/6
/// PPAA...
/// ```
#[must_use]
pub fn render_grid(grid: &Grid) -> String {
    let [p, a, u] = grid.slot_counts();
    let origin = match &grid.source {
        GridSource::Seed(seed) => format!("seed {seed:?}"),
        GridSource::Hull(id) => format!("hull {id}"),
    };
    let mut out = format!(
        "{origin} {}x{}, holes {}, P/A/U {p}/{a}/{u}\n",
        grid.rows,
        grid.cols,
        grid.hole_count()
    );
    if grid.meta.edge_utility + grid.meta.inner_utility > 0 || grid.meta.ammo_bias != 0 {
        let _ = writeln!(
            out,
            "reshape: edge {}, inner {}, ammo bias {}",
            grid.meta.edge_utility, grid.meta.inner_utility, grid.meta.ammo_bias
        );
    }
    out.push_str(&grid.to_ascii());
    out
}

/// Render a grid with placed modules overlaid.
///
/// Covered cells show the placement index as a lowercase letter (`a` for the
/// first placement, wrapping after `z`).
#[must_use]
pub fn render_fit(grid: &Grid, placed: &[PlacedModule], registry: &ModuleRegistry) -> String {
    let owners = occupancy(grid, placed, registry);
    let mut out = String::with_capacity(grid.cells.len() + grid.rows as usize);
    for (row_cells, row_owners) in grid
        .cells
        .chunks(grid.cols.max(1) as usize)
        .zip(owners.chunks(grid.cols.max(1) as usize))
    {
        for (cell, owner) in row_cells.iter().zip(row_owners) {
            out.push(match (owner, cell.hole, cell.slot) {
                (Some(index), _, _) => char::from(b'a' + (*index % 26) as u8),
                (None, true, _) => '#',
                (None, false, Some(slot)) => slot.symbol(),
                (None, false, None) => '.',
            });
        }
        out.push('\n');
    }
    out
}

/// Render stats as aligned `name value` lines in key order.
#[must_use]
pub fn render_stats(stats: &DerivedStats) -> String {
    let named = stats.to_named_map();
    let width = named.keys().map(|k| k.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, value) in named {
        let _ = writeln!(out, "{name:<width$}  {value}");
    }
    out
}

/// Render a bandwidth report as a per-module table with totals.
#[must_use]
pub fn render_bandwidth(report: &BandwidthReport) -> String {
    let mut out = String::new();
    for module in &report.modules {
        let _ = writeln!(
            out,
            "[{:>2}] {:<24} base {:>6.1}  mismatch {:>5.3}  cost {:>6.1}",
            module.index, module.module_id, module.base, module.mismatch, module.cost
        );
    }
    let _ = writeln!(
        out,
        "total {:.1} / limit {:.1}, over {:.1}, responsiveness {:.3}",
        report.total, report.limit, report.over, report.responsiveness
    );
    out
}

/// Machine-readable summary of a fit.
#[derive(Debug, Clone, Serialize)]
pub struct FitSummary<'a> {
    /// Seed the grid was generated from.
    pub seed: &'a str,
    /// System selection.
    pub selection: &'a FitSelection,
    /// Derived stats by external name.
    pub stats: BTreeMap<&'static str, f64>,
    /// Bandwidth breakdown.
    pub bandwidth: &'a BandwidthReport,
}

/// Render a fit summary as pretty RON.
///
/// # Errors
///
/// Returns [`ToolError::Argument`] if serialization fails.
pub fn render_summary_ron(summary: &FitSummary<'_>) -> ToolResult<String> {
    ron::ser::to_string_pretty(summary, ron::ser::PrettyConfig::default())
        .map_err(|e| ToolError::Argument(format!("cannot serialize summary: {e}")))
}
