//! Discrete module shapes and rotation algebra.
//!
//! Shapes are sets of `(dr, dc)` offsets relative to an anchor cell at
//! rotation 0. Rotations are quarter turns; covering a grid means rotating
//! the offsets and translating them by the anchor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quarter-turn rotation of a module.
///
/// Serialized as degrees. Deserializing any other angle fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    /// No rotation.
    #[default]
    R0,
    /// 90 degrees.
    R90,
    /// 180 degrees.
    R180,
    /// 270 degrees.
    R270,
}

impl Rotation {
    /// All rotations in increasing angle.
    pub const ALL: [Self; 4] = [Self::R0, Self::R90, Self::R180, Self::R270];

    /// Rotation for an angle of 0, 90, 180 or 270 degrees.
    #[must_use]
    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::R0),
            90 => Some(Self::R90),
            180 => Some(Self::R180),
            270 => Some(Self::R270),
            _ => None,
        }
    }

    /// Angle in degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }

    /// The next quarter turn.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::R0 => Self::R90,
            Self::R90 => Self::R180,
            Self::R180 => Self::R270,
            Self::R270 => Self::R0,
        }
    }
}

/// An angle that is not one of the four quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} degrees is not a quarter-turn rotation")]
pub struct InvalidRotation(pub u16);

impl TryFrom<u16> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees).ok_or(InvalidRotation(degrees))
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Cell offset relative to a module's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Offset {
    /// Row delta.
    pub dr: i32,
    /// Column delta.
    pub dc: i32,
}

impl Offset {
    /// Create a new offset.
    #[must_use]
    pub const fn new(dr: i32, dc: i32) -> Self {
        Self { dr, dc }
    }

    /// Rotate this offset by `rotation`.
    #[must_use]
    pub const fn rotate(self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::R0 => self,
            Rotation::R90 => Self::new(self.dc, -self.dr),
            Rotation::R180 => Self::new(-self.dr, -self.dc),
            Rotation::R270 => Self::new(-self.dc, self.dr),
        }
    }
}

/// Grid cell coordinate used as a placement anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Row index.
    pub row: u32,
    /// Column index.
    pub col: u32,
}

impl CellCoord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Footprint size class of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    /// Small.
    S,
    /// Medium.
    M,
    /// Large.
    L,
}

/// A module footprint.
///
/// # Example RON
///
/// ```ron
/// ModuleShape(
///     id: "bar2",
///     cells: [(dr: 0, dc: 0), (dr: 0, dc: 1)],
///     rotations: [0, 90],
///     size_class: S,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleShape {
    /// Shape identifier.
    pub id: String,
    /// Offsets at rotation 0.
    pub cells: Vec<Offset>,
    /// Rotations the shape may be placed at.
    #[serde(default = "all_rotations")]
    pub rotations: Vec<Rotation>,
    /// Footprint size class.
    pub size_class: SizeClass,
}

fn all_rotations() -> Vec<Rotation> {
    Rotation::ALL.to_vec()
}

impl ModuleShape {
    /// Create a shape that may be placed at any rotation.
    #[must_use]
    pub fn new(id: impl Into<String>, cells: Vec<Offset>, size_class: SizeClass) -> Self {
        Self {
            id: id.into(),
            cells,
            rotations: all_rotations(),
            size_class,
        }
    }

    /// A single-cell shape.
    #[must_use]
    pub fn single(id: impl Into<String>) -> Self {
        Self::new(id, vec![Offset::new(0, 0)], SizeClass::S)
    }

    /// Restrict the legal rotations.
    #[must_use]
    pub fn with_rotations(mut self, rotations: Vec<Rotation>) -> Self {
        self.rotations = rotations;
        self
    }

    /// Whether `rotation` is legal for this shape.
    #[must_use]
    pub fn allows(&self, rotation: Rotation) -> bool {
        self.rotations.contains(&rotation)
    }

    /// Number of cells the shape covers.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Rotate every offset by `rotation`.
#[must_use]
pub fn rotate_offsets(cells: &[Offset], rotation: Rotation) -> Vec<Offset> {
    cells.iter().map(|c| c.rotate(rotation)).collect()
}

/// Absolute `(row, col)` positions covered by `cells` placed at `anchor`.
///
/// Positions may be negative or beyond the grid; callers bounds-check.
#[must_use]
pub fn covered_positions(
    cells: &[Offset],
    anchor: CellCoord,
    rotation: Rotation,
) -> Vec<(i64, i64)> {
    cells
        .iter()
        .map(|c| {
            let r = c.rotate(rotation);
            (
                i64::from(anchor.row) + i64::from(r.dr),
                i64::from(anchor.col) + i64::from(r.dc),
            )
        })
        .collect()
}

/// Row-major indices covered by `cells` at `anchor` on a `rows` x `cols` grid.
///
/// Returns `None` if any covered cell falls outside the grid.
#[must_use]
pub fn covered_indices(
    cells: &[Offset],
    anchor: CellCoord,
    rotation: Rotation,
    rows: u32,
    cols: u32,
) -> Option<Vec<usize>> {
    covered_positions(cells, anchor, rotation)
        .into_iter()
        .map(|(r, c)| {
            if r >= 0 && c >= 0 && r < i64::from(rows) && c < i64::from(cols) {
                Some((r as usize) * (cols as usize) + (c as usize))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_tromino() -> Vec<Offset> {
        vec![Offset::new(0, 0), Offset::new(1, 0), Offset::new(1, 1)]
    }

    #[test]
    fn test_rotation_matrix() {
        let o = Offset::new(1, 2);
        assert_eq!(o.rotate(Rotation::R0), Offset::new(1, 2));
        assert_eq!(o.rotate(Rotation::R90), Offset::new(2, -1));
        assert_eq!(o.rotate(Rotation::R180), Offset::new(-1, -2));
        assert_eq!(o.rotate(Rotation::R270), Offset::new(-2, 1));
    }

    #[test]
    fn test_four_quarter_turns_is_identity() {
        let original = l_tromino();
        let mut cells = original.clone();
        for _ in 0..4 {
            cells = rotate_offsets(&cells, Rotation::R90);
        }
        assert_eq!(cells, original);
    }

    #[test]
    fn test_composed_rotations() {
        let cells = l_tromino();
        let twice = rotate_offsets(&rotate_offsets(&cells, Rotation::R90), Rotation::R90);
        assert_eq!(twice, rotate_offsets(&cells, Rotation::R180));
    }

    #[test]
    fn test_from_degrees_accepts_quarter_turns_only() {
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::R90));
        assert_eq!(Rotation::from_degrees(450), None);
        assert_eq!(Rotation::try_from(45), Err(InvalidRotation(45)));
        assert_eq!(Rotation::try_from(270), Ok(Rotation::R270));
        assert_eq!(Rotation::R270.next(), Rotation::R0);
    }

    #[test]
    fn test_covered_indices_in_bounds() {
        let idx = covered_indices(&l_tromino(), CellCoord::new(0, 0), Rotation::R0, 3, 3);
        assert_eq!(idx, Some(vec![0, 3, 4]));
    }

    #[test]
    fn test_covered_indices_out_of_bounds() {
        // Rotated 90 degrees the tromino reaches column -1.
        let idx = covered_indices(&l_tromino(), CellCoord::new(0, 0), Rotation::R90, 3, 3);
        assert_eq!(idx, None);

        let idx = covered_indices(&l_tromino(), CellCoord::new(2, 2), Rotation::R0, 3, 3);
        assert_eq!(idx, None);
    }

    #[test]
    fn test_shape_rotation_set() {
        let shape = ModuleShape::new("bar", vec![Offset::new(0, 0), Offset::new(0, 1)], SizeClass::S)
            .with_rotations(vec![Rotation::R0, Rotation::R90]);
        assert!(shape.allows(Rotation::R90));
        assert!(!shape.allows(Rotation::R180));
        assert_eq!(shape.cell_count(), 2);
    }

    #[test]
    fn test_rotation_serializes_as_degrees() {
        let encoded = ron::to_string(&vec![Rotation::R0, Rotation::R270]).expect("serializes");
        assert_eq!(encoded, "[0,270]");
        let decoded: Vec<Rotation> = ron::from_str("[90, 180, 45]").expect("parses");
        assert_eq!(decoded, vec![Rotation::R90, Rotation::R180, Rotation::R0]);
    }
}
