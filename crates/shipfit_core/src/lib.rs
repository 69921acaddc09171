//! # Shipfit Core
//!
//! Deterministic ship fitting core.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - Fixed-point ratio math where results must be reproducible
//!
//! The same catalog, selection and seed always produce the same grid,
//! placements and stats on every platform. This enables:
//! - Shareable permalinks that regenerate the exact fit
//! - Headless validation tooling
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`catalog`] - Ship sizes, systems, modules and hulls
//! - [`generator`] - Procedural slot grid generation
//! - [`hull`] - Fixed-hull grid construction
//! - [`placement`] - Module placement validation
//! - [`stats`] - Bandwidth and derived stat computation
//! - [`variants`] - Hull-tiered module variants
//! - [`permalink`] - Fit sharing codec
//! - [`session`] - Editable fit with undo/redo
//! - [`rng`] - Seeded string-keyed RNG
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod generator;
pub mod grid;
pub mod hull;
pub mod math;
pub mod permalink;
pub mod placement;
pub mod registry;
pub mod rng;
pub mod session;
pub mod shape;
pub mod stat_key;
pub mod stats;
pub mod variants;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{
        Catalog, FitSelection, HullClass, HullDef, ModuleDef, ModuleFamily, PrimaryArchetype,
        SecondaryDef, ShapeClass, ShipSize, SlotRatio, SlotType,
    };
    pub use crate::config::{BandwidthConfig, FitConfig, GeneratorConfig};
    pub use crate::error::{FitError, Result};
    pub use crate::generator::{generate_grid, generate_grid_for};
    pub use crate::grid::{Grid, GridCell, GridSource};
    pub use crate::hull::generate_grid_from_hull;
    pub use crate::math::Fixed;
    pub use crate::permalink::{decode_permalink, encode_permalink, FitPermalink};
    pub use crate::placement::{can_place, PlacedModule, PlacementResult};
    pub use crate::registry::ModuleRegistry;
    pub use crate::rng::SeededRng;
    pub use crate::session::FitSession;
    pub use crate::shape::{CellCoord, ModuleShape, Rotation};
    pub use crate::stat_key::{StatBlock, StatKey};
    pub use crate::stats::{compute_derived_stats, DerivedStats};
}
