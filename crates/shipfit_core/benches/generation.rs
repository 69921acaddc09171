//! Grid generation and stats benchmarks for shipfit_core.
//!
//! Run with: `cargo bench -p shipfit_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shipfit_core::catalog::HullClass;
use shipfit_core::config::{BandwidthConfig, GeneratorConfig};
use shipfit_core::generator::generate_grid_for;
use shipfit_core::placement::{can_place, PlacedModule};
use shipfit_core::shape::{CellCoord, Rotation};
use shipfit_core::stats::compute_derived_stats;
use shipfit_test_utils::fixtures::{sample_catalog, sample_registry, sample_selection};

/// Grid generation for every hull class.
pub fn generation_benchmark(c: &mut Criterion) {
    let catalog = sample_catalog();
    let config = GeneratorConfig::default();
    let mut group = c.benchmark_group("generate_grid");

    for size in HullClass::ALL {
        let mut selection = sample_selection();
        selection.size = size;
        group.bench_with_input(BenchmarkId::from_parameter(size.tier_name()), &selection, |b, sel| {
            b.iter(|| generate_grid_for(black_box(&catalog), sel, black_box("bench-seed"), &config))
        });
    }
    group.finish();
}

/// Derived stats for a capital grid filled with single-cell modules.
pub fn stats_benchmark(c: &mut Criterion) {
    let catalog = sample_catalog();
    let registry = sample_registry();
    let mut selection = sample_selection();
    selection.size = HullClass::Capital;
    let Ok(grid) = generate_grid_for(&catalog, &selection, "bench-seed", &GeneratorConfig::default())
    else {
        return;
    };

    let mut placed = Vec::new();
    let fillers = ["capacitor", "loader_arm", "sensor_suite"];
    for (i, cell) in grid.cells.iter().filter(|c| !c.hole).enumerate() {
        let id = fillers[i % fillers.len()];
        let Some(module) = registry.get(id) else {
            continue;
        };
        let anchor = CellCoord::new(cell.row, cell.col);
        if can_place(&grid, module, anchor, Rotation::R0, &placed, &registry).is_valid() {
            placed.push(PlacedModule::new(id, anchor, Rotation::R0));
        }
    }

    let size = catalog.ship_size(HullClass::Capital);
    let primary = catalog.primary(&selection.primary);
    let secondaries = catalog.resolve_secondaries(&selection).unwrap_or_default();
    let config = BandwidthConfig::default();

    c.bench_function("compute_derived_stats", |b| {
        b.iter(|| {
            compute_derived_stats(
                black_box(&placed),
                &registry,
                size,
                primary,
                &secondaries,
                Some(&grid),
                &config,
            )
        })
    });
}

criterion_group!(benches, generation_benchmark, stats_benchmark);
criterion_main!(benches);
