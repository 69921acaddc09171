//! Single-owner fit editing session.
//!
//! A session owns the selection, seed, generated grid, placement list and
//! undo/redo history for one fit. Every mutation recomputes the derived
//! stats wholesale; nothing is updated incrementally.

use crate::catalog::{Catalog, FitSelection, ModuleDef, SecondaryDef, ShipSize};
use crate::config::FitConfig;
use crate::error::{FitError, Result};
use crate::generator::generate_grid;
use crate::grid::Grid;
use crate::permalink::{decode_permalink, encode_permalink, FitPermalink};
use crate::placement::{
    can_place, is_placement_optimal, revalidate_placements, DroppedPlacement, PlacedModule,
    PlacementResult,
};
use crate::registry::ModuleRegistry;
use crate::shape::{CellCoord, Rotation};
use crate::stats::{bandwidth_report, compute_derived_stats, BandwidthReport, DerivedStats};

/// Maximum number of undo steps kept.
pub const UNDO_LIMIT: usize = 64;

#[derive(Debug, Clone)]
struct Snapshot {
    seed: String,
    selection: FitSelection,
    grid: Grid,
    placed: Vec<PlacedModule>,
}

/// Editing session for one fit.
#[derive(Debug, Clone)]
pub struct FitSession<'a> {
    catalog: &'a Catalog,
    registry: ModuleRegistry,
    config: FitConfig,
    selection: FitSelection,
    seed: String,
    grid: Grid,
    placed: Vec<PlacedModule>,
    stats: DerivedStats,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl<'a> FitSession<'a> {
    /// Start a session with an empty placement list.
    ///
    /// # Errors
    /// Returns an error if the selection does not resolve against the catalog.
    pub fn new(
        catalog: &'a Catalog,
        selection: FitSelection,
        seed: impl Into<String>,
        config: FitConfig,
    ) -> Result<Self> {
        let seed = seed.into();
        let grid = generate(catalog, &selection, &seed, &config)?;
        let mut session = Self {
            catalog,
            registry: ModuleRegistry::from_catalog(catalog),
            config,
            selection,
            seed,
            grid,
            placed: Vec::new(),
            stats: DerivedStats::default(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        session.refresh_stats();
        Ok(session)
    }

    /// Restore a session from a permalink.
    ///
    /// Placements that no longer fit are dropped and returned alongside the
    /// session.
    ///
    /// # Errors
    /// Returns [`FitError::Permalink`] if the permalink cannot be decoded.
    pub fn from_permalink(
        catalog: &'a Catalog,
        code: &str,
        config: FitConfig,
    ) -> Result<(Self, Vec<DroppedPlacement>)> {
        let registry = ModuleRegistry::from_catalog(catalog);
        let decoded = decode_permalink(code, catalog, &registry, &config.generator)?;
        let mut session = Self {
            catalog,
            registry,
            config,
            selection: decoded.selection,
            seed: decoded.seed,
            grid: decoded.grid,
            placed: decoded.placed,
            stats: DerivedStats::default(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        session.refresh_stats();
        Ok((session, decoded.dropped))
    }

    /// Encode the current fit as a permalink.
    ///
    /// # Errors
    /// Returns [`FitError::Permalink`] if the payload is too large.
    pub fn permalink(&self) -> Result<String> {
        let payload = FitPermalink::new(self.seed.clone(), &self.selection, &self.placed);
        Ok(encode_permalink(&payload)?)
    }

    /// Current grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current placements, in placement order.
    #[must_use]
    pub fn placed(&self) -> &[PlacedModule] {
        &self.placed
    }

    /// Current derived stats.
    #[must_use]
    pub const fn stats(&self) -> &DerivedStats {
        &self.stats
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &FitSelection {
        &self.selection
    }

    /// Current seed.
    #[must_use]
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Resolved module registry.
    #[must_use]
    pub const fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Per-module bandwidth breakdown of the current fit.
    #[must_use]
    pub fn bandwidth(&self) -> BandwidthReport {
        bandwidth_report(
            &self.placed,
            &self.registry,
            self.ship_size(),
            Some(&self.grid),
            &self.config.bandwidth,
        )
    }

    /// Whether an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Place a module, returning its index in the placement list.
    ///
    /// A canonical family id resolves to the family's variant for the current
    /// hull, and the placement records the variant id.
    ///
    /// # Errors
    /// Fails for unknown modules, modules needing a larger hull, and
    /// placements rejected by the validator.
    pub fn place(
        &mut self,
        module_id: &str,
        anchor: CellCoord,
        rotation: Rotation,
    ) -> Result<usize> {
        let module = self.mountable(module_id)?;
        let result = can_place(&self.grid, module, anchor, rotation, &self.placed, &self.registry);
        if !result.is_valid() {
            return Err(FitError::PlacementRejected(result));
        }
        let resolved_id = module.id.clone();

        self.checkpoint();
        self.placed.push(PlacedModule::new(resolved_id.as_str(), anchor, rotation));
        self.refresh_stats();
        tracing::debug!(
            requested = module_id,
            module = %resolved_id,
            row = anchor.row,
            col = anchor.col,
            "Placed module"
        );
        Ok(self.placed.len() - 1)
    }

    /// Remove the placement at `index`.
    ///
    /// # Errors
    /// Returns [`FitError::NoSuchPlacement`] for an invalid index.
    pub fn remove(&mut self, index: usize) -> Result<PlacedModule> {
        if index >= self.placed.len() {
            return Err(FitError::NoSuchPlacement(index));
        }
        self.checkpoint();
        let removed = self.placed.remove(index);
        self.refresh_stats();
        tracing::debug!(module = %removed.module_id, index, "Removed module");
        Ok(removed)
    }

    /// Move the placement at `index` to a new anchor, keeping its rotation.
    ///
    /// # Errors
    /// Fails for an invalid index or if the new position is rejected.
    pub fn move_module(&mut self, index: usize, anchor: CellCoord) -> Result<()> {
        let current = self.placed.get(index).ok_or(FitError::NoSuchPlacement(index))?;
        let rotation = current.rotation;
        self.replace_at(index, anchor, rotation)
    }

    /// Rotate the placement at `index` to its next allowed rotation.
    ///
    /// A shape with a single allowed rotation is left untouched and records
    /// no undo step.
    ///
    /// # Errors
    /// Fails for an invalid index or if the rotated footprint is rejected.
    pub fn rotate(&mut self, index: usize) -> Result<Rotation> {
        let current = self.placed.get(index).ok_or(FitError::NoSuchPlacement(index))?;
        let module = self.module(&current.module_id)?;
        let mut rotation = current.rotation.next();
        while !module.shape.allows(rotation) && rotation != current.rotation {
            rotation = rotation.next();
        }
        if rotation == current.rotation {
            return Ok(rotation);
        }
        let anchor = current.anchor;
        self.replace_at(index, anchor, rotation)?;
        Ok(rotation)
    }

    /// Remove every placement.
    pub fn clear(&mut self) {
        if self.placed.is_empty() {
            return;
        }
        self.checkpoint();
        self.placed.clear();
        self.refresh_stats();
        tracing::debug!("Cleared placements");
    }

    /// Undo the last mutation.
    ///
    /// # Errors
    /// Returns [`FitError::NothingToUndo`] when the history is empty.
    pub fn undo(&mut self) -> Result<()> {
        let snapshot = self.undo_stack.pop().ok_or(FitError::NothingToUndo)?;
        let current = self.snapshot();
        self.redo_stack.push(current);
        self.restore(snapshot);
        tracing::debug!(remaining = self.undo_stack.len(), "Undo");
        Ok(())
    }

    /// Redo the last undone mutation.
    ///
    /// # Errors
    /// Returns [`FitError::NothingToRedo`] when nothing was undone.
    pub fn redo(&mut self) -> Result<()> {
        let snapshot = self.redo_stack.pop().ok_or(FitError::NothingToRedo)?;
        let current = self.snapshot();
        self.undo_stack.push(current);
        self.restore(snapshot);
        tracing::debug!(remaining = self.redo_stack.len(), "Redo");
        Ok(())
    }

    /// Change the seed, regenerate the grid and drop placements that no
    /// longer fit.
    pub fn set_seed(&mut self, seed: impl Into<String>) -> Vec<DroppedPlacement> {
        let seed = seed.into();
        let grid = match generate(self.catalog, &self.selection, &seed, &self.config) {
            Ok(grid) => grid,
            Err(e) => {
                // The selection was validated when it was set.
                tracing::warn!(error = %e, "Selection no longer resolves");
                return Vec::new();
            }
        };
        self.checkpoint();
        self.seed = seed;
        self.regrid(grid)
    }

    /// Change the selection, regenerate the grid and drop placements that no
    /// longer fit.
    ///
    /// # Errors
    /// Returns an error if the selection does not resolve; the session is
    /// left unchanged.
    pub fn set_selection(&mut self, selection: FitSelection) -> Result<Vec<DroppedPlacement>> {
        let grid = generate(self.catalog, &selection, &self.seed, &self.config)?;
        self.checkpoint();
        self.selection = selection;
        Ok(self.regrid(grid))
    }

    /// Advisory check of a prospective placement.
    ///
    /// Returns [`PlacementResult::SlotMismatch`] for legal placements that
    /// cover cells of another slot type.
    ///
    /// # Errors
    /// Fails for unknown modules and modules needing a larger hull.
    pub fn placement_hint(
        &self,
        module_id: &str,
        anchor: CellCoord,
        rotation: Rotation,
    ) -> Result<PlacementResult> {
        let module = self.mountable(module_id)?;
        Ok(is_placement_optimal(
            &self.grid,
            module,
            anchor,
            rotation,
            &self.placed,
            &self.registry,
        ))
    }

    fn ship_size(&self) -> Option<&'a ShipSize> {
        self.catalog.ship_size(self.selection.size)
    }

    fn module(&self, id: &str) -> Result<&ModuleDef> {
        self.registry
            .get(id)
            .ok_or_else(|| FitError::UnknownModule(id.to_string()))
    }

    /// Registered module for `id`, resolving canonical family ids to the
    /// variant for the current hull. Concrete ids are taken as given.
    fn mountable(&self, id: &str) -> Result<&ModuleDef> {
        let module = match self.registry.get(id) {
            Some(module) => module,
            None => self
                .registry
                .variant_for(id, self.selection.size, &self.catalog.families)
                .ok_or_else(|| FitError::UnknownModule(id.to_string()))?,
        };
        match module.min_hull {
            Some(required) if !module.fits_hull(self.selection.size) => Err(FitError::HullTooSmall {
                module: module.id.clone(),
                required,
                actual: self.selection.size,
            }),
            _ => Ok(module),
        }
    }

    fn replace_at(&mut self, index: usize, anchor: CellCoord, rotation: Rotation) -> Result<()> {
        let mut others = self.placed.clone();
        let current = others.remove(index);
        let module = self.module(&current.module_id)?;
        let result = can_place(&self.grid, module, anchor, rotation, &others, &self.registry);
        if !result.is_valid() {
            return Err(FitError::PlacementRejected(result));
        }

        self.checkpoint();
        self.placed[index] = PlacedModule::new(current.module_id, anchor, rotation);
        self.refresh_stats();
        tracing::debug!(
            index,
            row = anchor.row,
            col = anchor.col,
            rotation = rotation.degrees(),
            "Moved module"
        );
        Ok(())
    }

    fn regrid(&mut self, grid: Grid) -> Vec<DroppedPlacement> {
        let placed = std::mem::take(&mut self.placed);
        let (kept, dropped) =
            revalidate_placements(&grid, placed, &self.registry, self.selection.size);
        self.grid = grid;
        self.placed = kept;
        self.refresh_stats();
        tracing::debug!(
            seed = %self.seed,
            kept = self.placed.len(),
            dropped = dropped.len(),
            "Regenerated grid"
        );
        dropped
    }

    fn secondaries(&self) -> Vec<&'a SecondaryDef> {
        let mut secondaries: Vec<&'a SecondaryDef> = self
            .selection
            .secondaries
            .iter()
            .filter_map(|id| self.catalog.secondary(id))
            .collect();
        secondaries.sort_by(|a, b| a.id.cmp(&b.id));
        secondaries
    }

    fn refresh_stats(&mut self) {
        let secondaries = self.secondaries();
        self.stats = compute_derived_stats(
            &self.placed,
            &self.registry,
            self.ship_size(),
            self.catalog.primary(&self.selection.primary),
            &secondaries,
            Some(&self.grid),
            &self.config.bandwidth,
        );
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            seed: self.seed.clone(),
            selection: self.selection.clone(),
            grid: self.grid.clone(),
            placed: self.placed.clone(),
        }
    }

    fn checkpoint(&mut self) {
        let snapshot = self.snapshot();
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > UNDO_LIMIT {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.seed = snapshot.seed;
        self.selection = snapshot.selection;
        self.grid = snapshot.grid;
        self.placed = snapshot.placed;
        self.refresh_stats();
    }
}

fn generate(
    catalog: &Catalog,
    selection: &FitSelection,
    seed: &str,
    config: &FitConfig,
) -> Result<Grid> {
    crate::generator::generate_grid_for(catalog, selection, seed, &config.generator)
}
