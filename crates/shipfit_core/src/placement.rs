//! Geometric placement validation.
//!
//! A placement is legal when its rotation is allowed and every covered cell
//! is inside the grid, not a hole, and not covered by another placement.
//! Slot-type mismatch is never a rejection here; the stats engine prices it.
//! [`is_placement_optimal`] is a separate advisory check that also requires
//! every covered cell to match the module's slot type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{HullClass, ModuleDef};
use crate::grid::Grid;
use crate::registry::ModuleRegistry;
use crate::shape::{covered_indices, covered_positions, CellCoord, Rotation};

/// A module placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedModule {
    /// Module id in the registry.
    pub module_id: String,
    /// Cell the shape's origin offset lands on.
    pub anchor: CellCoord,
    /// Rotation applied to the shape.
    pub rotation: Rotation,
}

impl PlacedModule {
    /// Create a placement.
    #[must_use]
    pub fn new(module_id: impl Into<String>, anchor: CellCoord, rotation: Rotation) -> Self {
        Self {
            module_id: module_id.into(),
            anchor,
            rotation,
        }
    }
}

/// Result of checking a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementResult {
    /// Placement is legal.
    Valid,
    /// The shape does not allow the requested rotation.
    RotationNotAllowed,
    /// A covered cell lies outside the grid.
    OutOfBounds,
    /// A covered cell is a hole.
    Hole,
    /// A covered cell is already occupied.
    Overlap,
    /// A covered cell's slot type differs from the module's (advisory only).
    SlotMismatch,
}

impl PlacementResult {
    /// Check if placement is valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Stable machine-readable rejection reason, `None` when valid.
    #[must_use]
    pub const fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::RotationNotAllowed => Some("rotation-not-allowed"),
            Self::OutOfBounds => Some("out-of-bounds"),
            Self::Hole => Some("hole"),
            Self::Overlap => Some("overlap"),
            Self::SlotMismatch => Some("slot-mismatch"),
        }
    }
}

impl fmt::Display for PlacementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason().unwrap_or("valid"))
    }
}

/// Row-major cell indices covered by a placement, or `None` if any covered
/// cell is outside the grid.
#[must_use]
pub fn footprint(
    grid: &Grid,
    module: &ModuleDef,
    anchor: CellCoord,
    rotation: Rotation,
) -> Option<Vec<usize>> {
    covered_indices(&module.shape.cells, anchor, rotation, grid.rows, grid.cols)
}

/// Per-cell occupancy built by replaying placements.
///
/// Each entry holds the index of the placement covering that cell. Placements
/// naming unknown modules are skipped, and cells outside the grid ignored.
#[must_use]
pub fn occupancy(
    grid: &Grid,
    placed: &[PlacedModule],
    registry: &ModuleRegistry,
) -> Vec<Option<usize>> {
    let mut occupied = vec![None; grid.len()];
    for (i, placement) in placed.iter().enumerate() {
        let Some(module) = registry.get(&placement.module_id) else {
            continue;
        };
        for (r, c) in covered_positions(&module.shape.cells, placement.anchor, placement.rotation) {
            let (Ok(r), Ok(c)) = (u32::try_from(r), u32::try_from(c)) else {
                continue;
            };
            if let Some(idx) = grid.index(r, c) {
                occupied[idx] = Some(i);
            }
        }
    }
    occupied
}

/// Check whether `module` may be placed at `anchor` with `rotation`.
///
/// Checks, in order: rotation allowed, then per covered cell bounds, hole
/// and overlap with `existing`.
#[must_use]
pub fn can_place(
    grid: &Grid,
    module: &ModuleDef,
    anchor: CellCoord,
    rotation: Rotation,
    existing: &[PlacedModule],
    registry: &ModuleRegistry,
) -> PlacementResult {
    let result = check_placement(grid, module, anchor, rotation, existing, registry);
    if !result.is_valid() {
        tracing::trace!(
            module = %module.id,
            row = anchor.row,
            col = anchor.col,
            rotation = rotation.degrees(),
            reason = %result,
            "Placement rejected"
        );
    }
    result
}

fn check_placement(
    grid: &Grid,
    module: &ModuleDef,
    anchor: CellCoord,
    rotation: Rotation,
    existing: &[PlacedModule],
    registry: &ModuleRegistry,
) -> PlacementResult {
    if !module.shape.allows(rotation) {
        return PlacementResult::RotationNotAllowed;
    }

    let occupied = occupancy(grid, existing, registry);
    for (r, c) in covered_positions(&module.shape.cells, anchor, rotation) {
        let idx = match (u32::try_from(r), u32::try_from(c)) {
            (Ok(r), Ok(c)) => grid.index(r, c),
            _ => None,
        };
        let Some(idx) = idx else {
            return PlacementResult::OutOfBounds;
        };
        if grid.cells[idx].hole {
            return PlacementResult::Hole;
        }
        if occupied[idx].is_some() {
            return PlacementResult::Overlap;
        }
    }

    PlacementResult::Valid
}

/// Why a placement was dropped when revalidated against a new grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The module id is not in the registry.
    UnknownModule,
    /// The module needs a larger hull than the ship has.
    HullTooSmall,
    /// The placement no longer fits the grid.
    Rejected(PlacementResult),
}

/// A placement removed during revalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedPlacement {
    /// The placement as it was.
    pub placement: PlacedModule,
    /// Why it was dropped.
    pub reason: DropReason,
}

/// Replay placements onto `grid`, keeping those that still fit.
///
/// Placements are checked in order against the ones already kept, so the
/// first of two overlapping placements wins.
#[must_use]
pub fn revalidate_placements(
    grid: &Grid,
    placements: Vec<PlacedModule>,
    registry: &ModuleRegistry,
    hull: HullClass,
) -> (Vec<PlacedModule>, Vec<DroppedPlacement>) {
    let mut kept: Vec<PlacedModule> = Vec::with_capacity(placements.len());
    let mut dropped = Vec::new();
    for placement in placements {
        let reason = match registry.get(&placement.module_id) {
            None => Some(DropReason::UnknownModule),
            Some(module) if !module.fits_hull(hull) => Some(DropReason::HullTooSmall),
            Some(module) => {
                let result = can_place(
                    grid,
                    module,
                    placement.anchor,
                    placement.rotation,
                    &kept,
                    registry,
                );
                (!result.is_valid()).then_some(DropReason::Rejected(result))
            }
        };
        match reason {
            Some(reason) => dropped.push(DroppedPlacement { placement, reason }),
            None => kept.push(placement),
        }
    }
    (kept, dropped)
}

/// Advisory check: legal placement whose every cell matches the slot type.
#[must_use]
pub fn is_placement_optimal(
    grid: &Grid,
    module: &ModuleDef,
    anchor: CellCoord,
    rotation: Rotation,
    existing: &[PlacedModule],
    registry: &ModuleRegistry,
) -> PlacementResult {
    let result = can_place(grid, module, anchor, rotation, existing, registry);
    if !result.is_valid() {
        return result;
    }
    let Some(cells) = footprint(grid, module, anchor, rotation) else {
        return PlacementResult::OutOfBounds;
    };
    if cells.iter().all(|&i| grid.cells[i].slot == Some(module.slot)) {
        PlacementResult::Valid
    } else {
        PlacementResult::SlotMismatch
    }
}

/// Fraction of a placement's in-bounds covered cells whose slot type
/// differs from the module's. Zero when nothing is covered.
#[must_use]
pub fn mismatch_fraction(grid: &Grid, module: &ModuleDef, placement: &PlacedModule) -> f64 {
    let mut covered = 0u32;
    let mut mismatched = 0u32;
    for (r, c) in covered_positions(&module.shape.cells, placement.anchor, placement.rotation) {
        let (Ok(r), Ok(c)) = (u32::try_from(r), u32::try_from(c)) else {
            continue;
        };
        if let Some(cell) = grid.get(r, c) {
            covered += 1;
            if cell.slot != Some(module.slot) {
                mismatched += 1;
            }
        }
    }
    if covered == 0 {
        0.0
    } else {
        f64::from(mismatched) / f64::from(covered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SlotType;
    use crate::grid::GridSource;
    use crate::shape::{ModuleShape, Offset, SizeClass};
    use crate::stat_key::StatBlock;

    /// 3x3 grid: top row Power, middle row Ammo, bottom row Utility, hole at (2, 2).
    fn create_test_grid() -> Grid {
        let mut grid = Grid::blank(3, 3, GridSource::Seed("test".to_string()));
        for cell in &mut grid.cells {
            cell.slot = Some(match cell.row {
                0 => SlotType::Power,
                1 => SlotType::Ammo,
                _ => SlotType::Utility,
            });
        }
        grid.cells[8].slot = None;
        grid.cells[8].hole = true;
        grid
    }

    fn bar2() -> ModuleDef {
        ModuleDef::new(
            "capacitor_bank",
            SlotType::Power,
            ModuleShape::new(
                "bar2",
                vec![Offset::new(0, 0), Offset::new(0, 1)],
                SizeClass::S,
            )
            .with_rotations(vec![Rotation::R0, Rotation::R90]),
            10.0,
            StatBlock::new(),
        )
    }

    fn registry() -> ModuleRegistry {
        vec![bar2()].into_iter().collect()
    }

    #[test]
    fn test_valid_placement() {
        let grid = create_test_grid();
        let result = can_place(&grid, &bar2(), CellCoord::new(0, 0), Rotation::R0, &[], &registry());
        assert!(result.is_valid());
        assert_eq!(result.reason(), None);
    }

    #[test]
    fn test_rotation_not_allowed() {
        let grid = create_test_grid();
        let result = can_place(&grid, &bar2(), CellCoord::new(0, 0), Rotation::R180, &[], &registry());
        assert_eq!(result, PlacementResult::RotationNotAllowed);
        assert_eq!(result.to_string(), "rotation-not-allowed");
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = create_test_grid();
        let registry = registry();
        assert_eq!(
            can_place(&grid, &bar2(), CellCoord::new(0, 2), Rotation::R0, &[], &registry),
            PlacementResult::OutOfBounds
        );
        // R90 maps (0, 1) to (1, 0): the second cell is below the anchor.
        assert_eq!(
            can_place(&grid, &bar2(), CellCoord::new(2, 0), Rotation::R90, &[], &registry),
            PlacementResult::OutOfBounds
        );
    }

    #[test]
    fn test_hole_rejected() {
        let grid = create_test_grid();
        assert_eq!(
            can_place(&grid, &bar2(), CellCoord::new(2, 1), Rotation::R0, &[], &registry()),
            PlacementResult::Hole
        );
    }

    #[test]
    fn test_overlap_rejected() {
        let grid = create_test_grid();
        let registry = registry();
        let existing = vec![PlacedModule::new("capacitor_bank", CellCoord::new(0, 0), Rotation::R0)];
        assert_eq!(
            can_place(&grid, &bar2(), CellCoord::new(0, 1), Rotation::R0, &existing, &registry),
            PlacementResult::Overlap
        );
        assert!(can_place(&grid, &bar2(), CellCoord::new(1, 0), Rotation::R0, &existing, &registry)
            .is_valid());
    }

    #[test]
    fn test_mismatch_is_not_a_rejection() {
        let grid = create_test_grid();
        let registry = registry();
        let result = can_place(&grid, &bar2(), CellCoord::new(1, 0), Rotation::R0, &[], &registry);
        assert!(result.is_valid());
        assert_eq!(
            is_placement_optimal(&grid, &bar2(), CellCoord::new(1, 0), Rotation::R0, &[], &registry),
            PlacementResult::SlotMismatch
        );
        assert!(
            is_placement_optimal(&grid, &bar2(), CellCoord::new(0, 1), Rotation::R0, &[], &registry)
                .is_valid()
        );
    }

    #[test]
    fn test_mismatch_fraction() {
        let grid = create_test_grid();
        let module = bar2();
        let vertical = PlacedModule::new("capacitor_bank", CellCoord::new(0, 0), Rotation::R90);
        assert!((mismatch_fraction(&grid, &module, &vertical) - 0.5).abs() < f64::EPSILON);
        let matched = PlacedModule::new("capacitor_bank", CellCoord::new(0, 0), Rotation::R0);
        assert!(mismatch_fraction(&grid, &module, &matched).abs() < f64::EPSILON);
    }

    #[test]
    fn test_occupancy_skips_unknown_modules() {
        let grid = create_test_grid();
        let placed = vec![
            PlacedModule::new("capacitor_bank", CellCoord::new(1, 1), Rotation::R0),
            PlacedModule::new("ghost", CellCoord::new(0, 0), Rotation::R0),
        ];
        let occupied = occupancy(&grid, &placed, &registry());
        assert_eq!(occupied.iter().filter(|o| o.is_some()).count(), 2);
        assert_eq!(occupied[4], Some(0));
        assert_eq!(occupied[0], None);
    }

    #[test]
    fn test_footprint() {
        let grid = create_test_grid();
        assert_eq!(
            footprint(&grid, &bar2(), CellCoord::new(1, 1), Rotation::R0),
            Some(vec![4, 5])
        );
        assert_eq!(footprint(&grid, &bar2(), CellCoord::new(1, 2), Rotation::R0), None);
    }

    #[test]
    fn test_revalidate_keeps_first_of_overlapping() {
        let grid = create_test_grid();
        let placed = vec![
            PlacedModule::new("capacitor_bank", CellCoord::new(0, 0), Rotation::R0),
            PlacedModule::new("capacitor_bank", CellCoord::new(0, 1), Rotation::R0),
            PlacedModule::new("capacitor_bank", CellCoord::new(2, 1), Rotation::R0),
            PlacedModule::new("ghost", CellCoord::new(1, 0), Rotation::R0),
        ];
        let (kept, dropped) = revalidate_placements(&grid, placed.clone(), &registry(), HullClass::Frigate);
        assert_eq!(kept, placed[..1].to_vec());
        let reasons: Vec<DropReason> = dropped.iter().map(|d| d.reason).collect();
        assert_eq!(
            reasons,
            vec![
                DropReason::Rejected(PlacementResult::Overlap),
                DropReason::Rejected(PlacementResult::Hole),
                DropReason::UnknownModule,
            ]
        );
    }

    #[test]
    fn test_revalidate_drops_oversized_modules() {
        let grid = create_test_grid();
        let mut heavy = bar2();
        heavy.min_hull = Some(HullClass::Cruiser);
        let registry: ModuleRegistry = vec![heavy].into_iter().collect();
        let placed = vec![PlacedModule::new("capacitor_bank", CellCoord::new(0, 0), Rotation::R0)];
        let (kept, dropped) = revalidate_placements(&grid, placed.clone(), &registry, HullClass::Destroyer);
        assert!(kept.is_empty());
        assert_eq!(dropped[0].reason, DropReason::HullTooSmall);
        let (kept, _) = revalidate_placements(&grid, placed, &registry, HullClass::Capital);
        assert_eq!(kept.len(), 1);
    }
}
