//! Slot grid produced by the generators.
//!
//! A grid is a row-major list of cells, each optionally typed with a
//! [`SlotType`] or flagged as a hole. Grids are immutable once generated;
//! changing the seed or selection produces a new grid.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::SlotType;
use crate::math::{fixed_serde, Fixed};

/// One cell of a slot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    /// Row index.
    pub row: u32,
    /// Column index.
    pub col: u32,
    /// Designated slot type, if any. Always `None` for holes.
    pub slot: Option<SlotType>,
    /// Whether the cell is unusable.
    pub hole: bool,
}

impl GridCell {
    /// Create an untyped, usable cell.
    #[must_use]
    pub const fn empty(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            slot: None,
            hole: false,
        }
    }

    /// Whether a module may cover this cell.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        !self.hole
    }
}

/// Where a grid came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridSource {
    /// Procedurally generated from a seed string.
    Seed(String),
    /// Stamped from a fixed hull template.
    Hull(String),
}

/// Effective slot ratio after blending, in fixed-point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EffectiveRatio {
    /// Power share.
    #[serde(with = "fixed_serde")]
    pub power: Fixed,
    /// Ammo share.
    #[serde(with = "fixed_serde")]
    pub ammo: Fixed,
    /// Utility share.
    #[serde(with = "fixed_serde")]
    pub utility: Fixed,
}

impl EffectiveRatio {
    /// Share for a slot type.
    #[must_use]
    pub fn get(&self, slot: SlotType) -> Fixed {
        match slot {
            SlotType::Power => self.power,
            SlotType::Ammo => self.ammo,
            SlotType::Utility => self.utility,
        }
    }
}

/// Traceability metadata recorded by the generators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridMeta {
    /// Blended ratio used for apportionment (procedural grids only).
    pub ratio: Option<EffectiveRatio>,
    /// Target slot counts `[power, ammo, utility]` before reshape.
    pub counts: [u32; 3],
    /// Cells forced to Utility near the edges.
    pub edge_utility: u32,
    /// Cells forced to Utility in the interior.
    pub inner_utility: u32,
    /// Clamped ammo wall bias.
    pub ammo_bias: i32,
    /// Number of carved holes.
    pub holes: u32,
}

/// Generated slot grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub cols: u32,
    /// Cells in row-major order.
    pub cells: Vec<GridCell>,
    /// Provenance.
    pub source: GridSource,
    /// Generation metadata.
    pub meta: GridMeta,
}

impl Grid {
    /// Create a grid of untyped, usable cells.
    #[must_use]
    pub fn blank(rows: u32, cols: u32, source: GridSource) -> Self {
        let cells = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| GridCell::empty(r, c)))
            .collect();
        Self {
            rows,
            cols,
            cells,
            source,
            meta: GridMeta::default(),
        }
    }

    /// Row-major index of a coordinate, if in bounds.
    #[must_use]
    pub fn index(&self, row: u32, col: u32) -> Option<usize> {
        if self.in_bounds(row, col) {
            Some((row as usize) * (self.cols as usize) + (col as usize))
        } else {
            None
        }
    }

    /// Check if coordinates are within grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, row: u32, col: u32) -> bool {
        row < self.rows && col < self.cols
    }

    /// Get the cell at coordinates.
    #[must_use]
    pub fn get(&self, row: u32, col: u32) -> Option<&GridCell> {
        self.index(row, col).and_then(|i| self.cells.get(i))
    }

    /// Total number of cells, holes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of non-hole cells.
    #[must_use]
    pub fn usable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_usable()).count()
    }

    /// Number of carved holes.
    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.cells.iter().filter(|c| c.hole).count()
    }

    /// Number of cells designated with `slot`.
    #[must_use]
    pub fn slot_count(&self, slot: SlotType) -> usize {
        self.cells.iter().filter(|c| c.slot == Some(slot)).count()
    }

    /// Slot counts as `[power, ammo, utility]`.
    #[must_use]
    pub fn slot_counts(&self) -> [usize; 3] {
        SlotType::ALL.map(|s| self.slot_count(s))
    }

    /// Whether the non-hole cells form a single 4-connected component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let holes: Vec<bool> = self.cells.iter().map(|c| c.hole).collect();
        is_connected(self.rows, self.cols, &holes)
    }

    /// Render the grid as text, one line per row.
    ///
    /// `#` marks holes, `.` untyped cells, and `P`/`A`/`U` slot types.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.rows as usize);
        for row in self.cells.chunks(self.cols.max(1) as usize) {
            for cell in row {
                out.push(match (cell.hole, cell.slot) {
                    (true, _) => '#',
                    (false, Some(slot)) => slot.symbol(),
                    (false, None) => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}

/// BFS connectivity check over a row-major hole mask.
///
/// Succeeds iff the number of cells reachable from the first non-hole cell
/// equals the total non-hole count. A mask with no usable cells counts as
/// connected.
#[must_use]
pub fn is_connected(rows: u32, cols: u32, holes: &[bool]) -> bool {
    let total = holes.iter().filter(|h| !**h).count();
    let Some(start) = holes.iter().position(|h| !*h) else {
        return true;
    };

    let cols = cols as usize;
    let rows = rows as usize;
    let mut visited = vec![false; holes.len()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;
    let mut reached = 0usize;

    while let Some(idx) = queue.pop_front() {
        reached += 1;
        let (r, c) = (idx / cols, idx % cols);
        let mut neighbors = [None; 4];
        if r > 0 {
            neighbors[0] = Some(idx - cols);
        }
        if r + 1 < rows {
            neighbors[1] = Some(idx + cols);
        }
        if c > 0 {
            neighbors[2] = Some(idx - 1);
        }
        if c + 1 < cols {
            neighbors[3] = Some(idx + 1);
        }
        for next in neighbors.into_iter().flatten() {
            if !holes[next] && !visited[next] {
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }

    reached == total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(rows: u32, cols: u32) -> Grid {
        Grid::blank(rows, cols, GridSource::Seed("test".to_string()))
    }

    #[test]
    fn test_blank_grid_layout() {
        let grid = blank(2, 3);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.cells[4], GridCell::empty(1, 1));
        assert_eq!(grid.usable_count(), 6);
        assert_eq!(grid.hole_count(), 0);
    }

    #[test]
    fn test_index_and_bounds() {
        let grid = blank(2, 3);
        assert_eq!(grid.index(1, 2), Some(5));
        assert_eq!(grid.index(2, 0), None);
        assert_eq!(grid.index(0, 3), None);
        assert!(grid.get(1, 0).is_some());
    }

    #[test]
    fn test_connected_full_grid() {
        assert!(blank(3, 3).is_connected());
    }

    #[test]
    fn test_disconnected_by_middle_column() {
        // 3x3 with the middle column removed splits left from right.
        let holes = [
            false, true, false, //
            false, true, false, //
            false, true, false,
        ];
        assert!(!is_connected(3, 3, &holes));
    }

    #[test]
    fn test_corner_hole_stays_connected() {
        let holes = [
            true, false, false, //
            false, false, false, //
            false, false, false,
        ];
        assert!(is_connected(3, 3, &holes));
    }

    #[test]
    fn test_isolated_corner_cell() {
        // Cell (0, 0) is cut off by holes at (0, 1) and (1, 0).
        let holes = [
            false, true, false, //
            true, false, false, //
            false, false, false,
        ];
        assert!(!is_connected(3, 3, &holes));
    }

    #[test]
    fn test_all_holes_is_connected() {
        assert!(is_connected(2, 2, &[true; 4]));
    }

    #[test]
    fn test_slot_counts_and_ascii() {
        let mut grid = blank(1, 4);
        grid.cells[0].slot = Some(SlotType::Power);
        grid.cells[1].slot = Some(SlotType::Ammo);
        grid.cells[2].hole = true;
        assert_eq!(grid.slot_counts(), [1, 1, 0]);
        assert_eq!(grid.to_ascii(), "PA#.\n");
    }
}
