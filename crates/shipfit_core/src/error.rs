//! Error types for the fitting core.

use thiserror::Error;

use crate::catalog::HullClass;
use crate::placement::PlacementResult;

/// Result type alias using [`FitError`].
pub type Result<T> = std::result::Result<T, FitError>;

/// Top-level error type for fitting operations.
///
/// Placement rejections on their own are plain [`PlacementResult`] values;
/// they only become errors when a session is asked to commit them.
#[derive(Debug, Error)]
pub enum FitError {
    /// Ship size not present in the catalog.
    #[error("Unknown ship size: {0:?}")]
    UnknownShipSize(HullClass),

    /// Primary archetype not present in the catalog.
    #[error("Unknown primary archetype: {0}")]
    UnknownPrimary(String),

    /// Secondary system not present in the catalog.
    #[error("Unknown secondary system: {0}")]
    UnknownSecondary(String),

    /// Module not present in the registry.
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// Hull not present in the catalog.
    #[error("Unknown hull: {0}")]
    UnknownHull(String),

    /// More secondaries were selected than a fit allows.
    #[error("Too many secondary systems: {count} selected, at most {max} allowed")]
    TooManySecondaries {
        /// Number of secondaries selected.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// The same secondary was selected twice.
    #[error("Secondary system selected twice: {0}")]
    DuplicateSecondary(String),

    /// Placement failed geometric validation.
    #[error("Placement rejected: {0}")]
    PlacementRejected(PlacementResult),

    /// Module requires a larger hull than the current ship size.
    #[error("Module '{module}' requires at least a {required:?} hull, ship is {actual:?}")]
    HullTooSmall {
        /// Module identifier.
        module: String,
        /// Minimum hull class the module needs.
        required: HullClass,
        /// Hull class of the current fit.
        actual: HullClass,
    },

    /// No placement exists at the given list index.
    #[error("No placed module at index {0}")]
    NoSuchPlacement(usize),

    /// Undo stack is empty.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Redo stack is empty.
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Catalog or config document failed to parse.
    #[error("Failed to parse {what}: {message}")]
    ParseError {
        /// Kind of document being parsed.
        what: &'static str,
        /// Parser message.
        message: String,
    },

    /// Permalink could not be decoded.
    #[error(transparent)]
    Permalink(#[from] crate::permalink::PermalinkError),
}
