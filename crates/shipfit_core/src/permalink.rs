//! Shareable fit permalinks.
//!
//! A permalink is the URL-safe, unpadded base64 encoding of a compact
//! binary payload holding the seed, the selection and the placement list.
//! The grid itself is never stored: decoding regenerates it from the seed,
//! so a permalink is only as stable as the generator and RNG versions.
//!
//! Decoding is forgiving about content and strict about framing. Bad
//! base64, a corrupt payload, a foreign version or an unknown size or
//! primary fail the decode. Unknown secondaries and placements that no
//! longer fit the regenerated grid are dropped with a warning.

use std::collections::BTreeSet;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bincode::Options;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, FitSelection, HullClass, MAX_SECONDARIES};
use crate::config::GeneratorConfig;
use crate::generator::generate_grid;
use crate::grid::Grid;
use crate::placement::{revalidate_placements, DroppedPlacement, PlacedModule};
use crate::registry::ModuleRegistry;

/// Current permalink payload version.
pub const PERMALINK_VERSION: u32 = 1;

/// Upper bound on decoded payload size in bytes.
const MAX_PAYLOAD_BYTES: u64 = 16 * 1024;

/// Errors that fail a permalink decode.
#[derive(Debug, Error)]
pub enum PermalinkError {
    /// The permalink string was empty.
    #[error("Permalink is empty")]
    Empty,

    /// The permalink is not valid URL-safe base64.
    #[error("Permalink is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The decoded bytes are not a valid payload.
    #[error("Permalink payload is corrupt: {0}")]
    Payload(#[from] bincode::Error),

    /// The payload was written by an incompatible version.
    #[error("Unsupported permalink version {0} (expected {expected})", expected = PERMALINK_VERSION)]
    UnsupportedVersion(u32),

    /// The payload names a ship size the catalog lacks.
    #[error("Permalink names unknown ship size {0:?}")]
    UnknownShipSize(HullClass),

    /// The payload names a primary the catalog lacks.
    #[error("Permalink names unknown primary '{0}'")]
    UnknownPrimary(String),
}

/// Serialized content of a permalink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitPermalink {
    /// Payload version.
    pub version: u32,
    /// Grid seed.
    pub seed: String,
    /// Ship size.
    pub size: HullClass,
    /// Primary archetype id.
    pub primary: String,
    /// Secondary system ids.
    pub secondaries: Vec<String>,
    /// Placements in list order.
    pub placed: Vec<PlacedModule>,
}

impl FitPermalink {
    /// Build a current-version payload.
    #[must_use]
    pub fn new(seed: impl Into<String>, selection: &FitSelection, placed: &[PlacedModule]) -> Self {
        Self {
            version: PERMALINK_VERSION,
            seed: seed.into(),
            size: selection.size,
            primary: selection.primary.clone(),
            secondaries: selection.secondaries.clone(),
            placed: placed.to_vec(),
        }
    }

    /// The selection this payload describes.
    #[must_use]
    pub fn selection(&self) -> FitSelection {
        FitSelection {
            size: self.size,
            primary: self.primary.clone(),
            secondaries: self.secondaries.clone(),
        }
    }
}

/// Result of decoding a permalink against a catalog.
#[derive(Debug, Clone)]
pub struct DecodedFit {
    /// Grid seed.
    pub seed: String,
    /// Selection with unknown secondaries removed.
    pub selection: FitSelection,
    /// Grid regenerated from the seed.
    pub grid: Grid,
    /// Placements that still fit, in encoded order.
    pub placed: Vec<PlacedModule>,
    /// Placements that were dropped.
    pub dropped: Vec<DroppedPlacement>,
    /// Secondary ids that were dropped.
    pub dropped_secondaries: Vec<String>,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_PAYLOAD_BYTES)
}

/// Encode a payload as a permalink string.
///
/// # Errors
/// Returns [`PermalinkError::Payload`] if the payload exceeds the size limit.
pub fn encode_permalink(fit: &FitPermalink) -> Result<String, PermalinkError> {
    let bytes = codec().serialize(fit)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Decode the raw payload of a permalink without consulting a catalog.
///
/// # Errors
/// Fails on empty input, bad base64, a corrupt payload or a foreign version.
pub fn decode_payload(code: &str) -> Result<FitPermalink, PermalinkError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(PermalinkError::Empty);
    }
    let bytes = URL_SAFE_NO_PAD.decode(code.as_bytes())?;
    let fit: FitPermalink = codec().deserialize(&bytes)?;
    if fit.version != PERMALINK_VERSION {
        return Err(PermalinkError::UnsupportedVersion(fit.version));
    }
    Ok(fit)
}

/// Decode a permalink, regenerate its grid and keep the placements that fit.
///
/// # Errors
/// Fails for the framing errors of [`decode_payload`] and for an unknown
/// ship size or primary.
pub fn decode_permalink(
    code: &str,
    catalog: &Catalog,
    registry: &ModuleRegistry,
    config: &GeneratorConfig,
) -> Result<DecodedFit, PermalinkError> {
    let fit = decode_payload(code)?;

    let size = catalog
        .ship_size(fit.size)
        .ok_or(PermalinkError::UnknownShipSize(fit.size))?;
    let primary = catalog
        .primary(&fit.primary)
        .ok_or_else(|| PermalinkError::UnknownPrimary(fit.primary.clone()))?;

    let mut seen = BTreeSet::new();
    let mut secondaries = Vec::new();
    let mut dropped_secondaries = Vec::new();
    for id in &fit.secondaries {
        match catalog.secondary(id) {
            Some(def) if secondaries.len() < MAX_SECONDARIES && seen.insert(id.as_str()) => {
                secondaries.push(def);
            }
            _ => dropped_secondaries.push(id.clone()),
        }
    }
    if !dropped_secondaries.is_empty() {
        tracing::warn!(dropped = ?dropped_secondaries, "Permalink secondaries dropped");
    }

    let grid = generate_grid(primary, &secondaries, size, &fit.seed, config);

    let (placed, dropped) = revalidate_placements(&grid, fit.placed, registry, size.id);
    if !dropped.is_empty() {
        tracing::warn!(
            dropped = dropped.len(),
            kept = placed.len(),
            "Permalink placements dropped"
        );
    }

    let mut selection = FitSelection::new(fit.size, fit.primary);
    selection.secondaries = secondaries.iter().map(|s| s.id.clone()).collect();

    Ok(DecodedFit {
        seed: fit.seed,
        selection,
        grid,
        placed,
        dropped,
        dropped_secondaries,
    })
}
