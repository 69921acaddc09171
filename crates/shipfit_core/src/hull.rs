//! Fixed-hull grid stamping.

use crate::catalog::{HullClass, HullDef};
use crate::grid::{Grid, GridMeta, GridSource};

/// Project a hull's explicit slot list onto a grid.
///
/// Cells start empty and each declared slot is stamped on in list order, a
/// later entry for the same cell overwriting an earlier one. Slots outside
/// the hull's dimensions are ignored. No randomness is involved.
#[must_use]
pub fn generate_grid_from_hull(hull: &HullDef) -> Grid {
    let mut grid = Grid::blank(hull.rows, hull.cols, GridSource::Hull(hull.id.clone()));

    let mut ignored = 0usize;
    for slot in &hull.slots {
        match grid.index(slot.r, slot.c) {
            Some(idx) => grid.cells[idx].slot = Some(slot.slot),
            None => ignored += 1,
        }
    }
    if ignored > 0 {
        tracing::debug!(hull = %hull.id, ignored, "Ignored out-of-bounds hull slots");
    }

    let counts = grid.slot_counts().map(|c| c as u32);
    grid.meta = GridMeta {
        counts,
        ..GridMeta::default()
    };
    grid
}

/// Hull templates of a given class, in catalog order.
pub fn hulls_of_class(hulls: &[HullDef], class: HullClass) -> impl Iterator<Item = &HullDef> {
    hulls.iter().filter(move |h| h.size == class)
}

/// Number of typed cells of each slot type declared by a hull, in bounds only.
#[must_use]
pub fn declared_slot_counts(hull: &HullDef) -> [usize; 3] {
    generate_grid_from_hull(hull).slot_counts()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HullSlot, SlotType};

    fn skiff() -> HullDef {
        HullDef {
            id: "skiff".to_string(),
            name: "Skiff".to_string(),
            size: HullClass::Frigate,
            rows: 2,
            cols: 3,
            slots: vec![
                HullSlot {
                    r: 0,
                    c: 0,
                    slot: SlotType::Power,
                },
                HullSlot {
                    r: 1,
                    c: 2,
                    slot: SlotType::Ammo,
                },
                HullSlot {
                    r: 4,
                    c: 0,
                    slot: SlotType::Utility,
                },
            ],
        }
    }

    #[test]
    fn test_stamp_hull_slots() {
        let grid = generate_grid_from_hull(&skiff());
        assert_eq!((grid.rows, grid.cols), (2, 3));
        assert_eq!(grid.source, GridSource::Hull("skiff".to_string()));
        assert_eq!(grid.to_ascii(), "P..\n..A\n");
        assert_eq!(grid.hole_count(), 0);
        assert_eq!(grid.meta.counts, [1, 1, 0]);
        assert!(grid.meta.ratio.is_none());
    }

    #[test]
    fn test_out_of_bounds_slots_ignored() {
        assert_eq!(declared_slot_counts(&skiff()), [1, 1, 0]);
    }

    #[test]
    fn test_later_slot_overwrites() {
        let mut hull = skiff();
        hull.slots.push(HullSlot {
            r: 0,
            c: 0,
            slot: SlotType::Utility,
        });
        let grid = generate_grid_from_hull(&hull);
        assert_eq!(grid.get(0, 0).and_then(|c| c.slot), Some(SlotType::Utility));
    }

    #[test]
    fn test_hull_stamping_is_deterministic() {
        assert_eq!(generate_grid_from_hull(&skiff()), generate_grid_from_hull(&skiff()));
    }

    #[test]
    fn test_hulls_of_class() {
        let mut cutter = skiff();
        cutter.id = "cutter".to_string();
        cutter.size = HullClass::Destroyer;
        let hulls = vec![skiff(), cutter];
        let ids: Vec<&str> = hulls_of_class(&hulls, HullClass::Frigate)
            .map(|h| h.id.as_str())
            .collect();
        assert_eq!(ids, vec!["skiff"]);
    }
}
