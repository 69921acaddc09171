//! Determinism testing utilities.
//!
//! Provides a harness for verifying that grid generation and stat
//! computation produce identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A permalink only carries the seed, the selection and the placements, so
//! every consumer must regenerate bit-identical grids. Sources of
//! non-determinism include:
//!
//! - **Floating-point ratio math**: Blending uses fixed-point arithmetic via
//!   [`shipfit_core::math::Fixed`] so apportionment is exact.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Stat maps are `BTreeMap`s and secondaries are blended in id order.
//!
//! - **System randomness**: No calls to `rand()`. Every random decision
//!   draws from a [`shipfit_core::rng::SeededRng`] keyed by a derived seed.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual generator steps (carve, apportion, reshape)
//! 2. **Property tests**: Random seeds and selections still produce
//!    deterministic outputs
//! 3. **Parallel tests**: Generating the same grid on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use serde::Serialize;
use shipfit_core::catalog::{Catalog, FitSelection};
use shipfit_core::config::GeneratorConfig;
use shipfit_core::generator::generate_grid_for;
use shipfit_core::grid::Grid;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic computation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Computation is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a computation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the computation
/// * `run` - Function producing the result
/// * `hash` - Function to compute the result hash
///
/// # Example
///
/// ```ignore
/// use shipfit_test_utils::determinism::{grid_hash, verify_determinism};
///
/// let result = verify_determinism(
///     5,
///     || generate_grid_for(&catalog, &selection, "seed", &config).unwrap(),
///     grid_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Run, HashFn>(runs: usize, run: Run, hash: HashFn) -> DeterminismResult
where
    Run: Fn() -> S,
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs).map(|_| hash(&run())).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Generate the same grid twice and compare hashes.
///
/// Returns `false` if the selection does not resolve.
pub fn verify_grid_determinism(
    catalog: &Catalog,
    selection: &FitSelection,
    seed: &str,
    config: &GeneratorConfig,
) -> bool {
    let result = verify_determinism(
        2,
        || generate_grid_for(catalog, selection, seed, config).ok(),
        |grid| grid.as_ref().map_or(0, grid_hash),
    );
    result.is_deterministic && result.hashes.first().is_some_and(|h| *h != 0)
}

/// Result of parallel generation runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Hash from each thread.
    pub hashes: Vec<u64>,
    /// Number of threads run.
    pub num_runs: usize,
}

impl ParallelRunResult {
    /// Check if all threads produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all threads matched.
    ///
    /// # Panics
    ///
    /// Panics if threads produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel runs diverged!\n\
                 Runs: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_runs,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a computation on N scoped threads and collect the result hashes.
///
/// Catches hidden shared state that only diverges under concurrent use.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_scoped<S, Run, HashFn>(
    num_runs: usize,
    run: Run,
    hash: HashFn,
) -> ParallelRunResult
where
    Run: Fn() -> S + Sync,
    HashFn: Fn(&S) -> u64 + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| s.spawn(|| hash(&run())))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("worker thread panicked"))
            .collect()
    });

    ParallelRunResult { hashes, num_runs }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash any serializable value through its bincode encoding.
///
/// Used for values holding floats, which are not `Hash`.
pub fn compute_bytes_hash<T: Serialize>(value: &T) -> u64 {
    match bincode::serialize(value) {
        Ok(bytes) => compute_hash(&bytes),
        Err(_) => 0,
    }
}

/// Hash of a grid, covering dimensions, cells, source and metadata.
pub fn grid_hash(grid: &Grid) -> u64 {
    compute_hash(grid)
}

/// Proptest strategies for fitting inputs.
///
/// These strategies generate random but reproducible inputs drawn from the
/// sample catalog in [`crate::fixtures`].
pub mod strategies {
    use proptest::prelude::*;
    use shipfit_core::catalog::{FitSelection, HullClass};
    use shipfit_core::shape::{CellCoord, Offset, Rotation};

    use crate::fixtures::{sample_primaries, sample_secondaries};

    /// Generate a seed string.
    pub fn arb_seed() -> impl Strategy<Value = String> {
        "[a-z0-9]{0,12}"
    }

    /// Generate a hull class.
    pub fn arb_hull_class() -> impl Strategy<Value = HullClass> {
        prop::sample::select(HullClass::ALL.to_vec())
    }

    /// Generate a rotation.
    pub fn arb_rotation() -> impl Strategy<Value = Rotation> {
        prop::sample::select(Rotation::ALL.to_vec())
    }

    /// Generate an offset within a small footprint.
    pub fn arb_offset() -> impl Strategy<Value = Offset> {
        (-3i32..=3, -3i32..=3).prop_map(|(dr, dc)| Offset::new(dr, dc))
    }

    /// Generate an anchor within a capital-sized grid.
    pub fn arb_anchor() -> impl Strategy<Value = CellCoord> {
        (0u32..8, 0u32..10).prop_map(|(row, col)| CellCoord::new(row, col))
    }

    /// Generate a valid selection from the sample catalog.
    ///
    /// Secondaries are distinct and at most two.
    pub fn arb_selection() -> impl Strategy<Value = FitSelection> {
        let primaries: Vec<String> = sample_primaries().into_iter().map(|p| p.id).collect();
        let secondaries: Vec<String> = sample_secondaries().into_iter().map(|s| s.id).collect();
        (
            arb_hull_class(),
            prop::sample::select(primaries),
            prop::sample::subsequence(secondaries, 0..=2),
        )
            .prop_map(|(size, primary, secondaries)| FitSelection {
                size,
                primary,
                secondaries,
            })
    }

    /// Generate a list of placement attempts from a module id pool.
    pub fn arb_placements(
        module_ids: Vec<String>,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<(String, CellCoord, Rotation)>> {
        proptest::collection::vec(
            (prop::sample::select(module_ids), arb_anchor(), arb_rotation()),
            0..max_len,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_catalog, sample_selection};
    use proptest::prelude::*;
    use shipfit_core::catalog::HullClass;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, || 42u64, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![42, 42, 42]);
    }

    #[test]
    fn test_detects_non_determinism() {
        let counter = std::cell::Cell::new(0u64);
        let result = verify_determinism(
            3,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |n| *n,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 3);
    }

    #[test]
    fn test_sample_grid_determinism() {
        let catalog = sample_catalog();
        assert!(verify_grid_determinism(
            &catalog,
            &sample_selection(),
            "alpha",
            &GeneratorConfig::default()
        ));
    }

    #[test]
    fn test_unknown_selection_is_not_deterministic() {
        let catalog = sample_catalog();
        let selection = FitSelection::new(HullClass::Frigate, "missing");
        assert!(!verify_grid_determinism(
            &catalog,
            &selection,
            "alpha",
            &GeneratorConfig::default()
        ));
    }

    #[test]
    fn test_parallel_generation() {
        let catalog = sample_catalog();
        let selection = sample_selection();
        let config = GeneratorConfig::default();
        let result = run_parallel_scoped(
            8,
            || generate_grid_for(&catalog, &selection, "parallel", &config).ok(),
            |grid| grid.as_ref().map_or(0, grid_hash),
        );
        result.assert_deterministic();
        assert_eq!(result.hashes.len(), 8);
    }

    #[test]
    fn test_bytes_hash_distinguishes_floats() {
        assert_ne!(compute_bytes_hash(&1.0f64), compute_bytes_hash(&1.000_001f64));
        assert_eq!(compute_bytes_hash(&0.5f64), compute_bytes_hash(&0.5f64));
    }

    proptest! {
        #[test]
        fn prop_generation_deterministic(
            selection in strategies::arb_selection(),
            seed in strategies::arb_seed(),
        ) {
            let catalog = sample_catalog();
            prop_assert!(verify_grid_determinism(
                &catalog,
                &selection,
                &seed,
                &GeneratorConfig::default()
            ));
        }
    }
}
