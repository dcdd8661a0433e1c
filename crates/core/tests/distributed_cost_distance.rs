//! End-to-end tests of the round driver
//!
//! These tests check the distributed result against direct kernel runs over
//! single tiles and over the whole stitched grid, and verify the round-level
//! properties: monotone relaxation, termination within the tile diameter,
//! bound enforcement and determinism.

use approx::assert_relative_eq;
use costdist_core::{
    relax_tile, Connectivity, CostDistance, CostDistanceConfig, CostQueue, FrictionLayer, GeoPoint,
    KernelParams, RegularLayout, TileData, TileKey, TileLayout, BoundaryEntry,
};
use ctor::ctor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Layer on unit cells whose friction is `friction(global_col, global_row)`
fn layer_from_fn(
    layout_cols: u32,
    layout_rows: u32,
    tile_cols: usize,
    tile_rows: usize,
    mut friction: impl FnMut(usize, usize) -> f64,
) -> FrictionLayer<RegularLayout> {
    let layout = RegularLayout::unit_cells(layout_cols, layout_rows, tile_cols, tile_rows);
    let tiles: Vec<_> = layout
        .bounds()
        .keys()
        .map(|key| {
            let (col0, row0) = (key.col as usize * tile_cols, key.row as usize * tile_rows);
            let tile = TileData::from_fn(tile_cols, tile_rows, |c, r| friction(col0 + c, row0 + r));
            (key, tile)
        })
        .collect();
    FrictionLayer::from_tiles(layout, tiles).expect("tiles match layout")
}

fn random_layer(seed: u64, layout_cols: u32, layout_rows: u32, size: (usize, usize)) -> FrictionLayer<RegularLayout> {
    let mut rng = StdRng::seed_from_u64(seed);
    layer_from_fn(layout_cols, layout_rows, size.0, size.1, |_, _| {
        if rng.random_bool(0.06) {
            f64::NAN
        } else {
            rng.random_range(0.2..5.0)
        }
    })
}

/// Point at the center of global cell `(col, row)` of a unit-cell layout
fn cell_center(col: usize, row: usize) -> GeoPoint {
    GeoPoint::new(col as f64 + 0.5, -(row as f64) - 0.5)
}

/// Whole friction grid as one tile
fn stitch(layer: &FrictionLayer<RegularLayout>) -> TileData {
    let layout = layer.layout();
    let (tile_cols, tile_rows) = (layout.tile_cols(), layout.tile_rows());
    let bounds = layout.bounds();
    TileData::from_fn(bounds.layout_cols() * tile_cols, bounds.layout_rows() * tile_rows, |c, r| {
        let key = TileKey::new((c / tile_cols) as i32, (r / tile_rows) as i32);
        layer.get(key).map_or(f64::NAN, |tile| tile.get(c % tile_cols, r % tile_rows))
    })
}

fn global_cost(
    layer: &FrictionLayer<RegularLayout>,
    sources: &[(usize, usize)],
    params: &KernelParams,
) -> TileData {
    let friction = stitch(layer);
    let seeds: CostQueue = sources
        .iter()
        .map(|&(c, r)| BoundaryEntry::source(c, r, friction.get(c, r)))
        .collect();
    let prior = TileData::unreached(friction.cols(), friction.rows());
    relax_tile(&friction, &prior, seeds, params).cost
}

fn unit_config() -> CostDistanceConfig {
    CostDistanceConfig::default().with_resolution(1.0)
}

#[test]
fn test_two_tile_uniform_scenario() {
    let layer = layer_from_fn(2, 1, 4, 4, |_, _| 1.0);
    let driver = CostDistance::new(&layer, unit_config()).expect("valid config");
    let result = driver.run(&[cell_center(0, 0)]).expect("run succeeds");

    for row in 0..4 {
        for col in 0..4 {
            assert_eq!(result.cost_at(TileKey::new(0, 0), col, row), Some((col + row) as f64));
            assert_eq!(result.cost_at(TileKey::new(1, 0), col, row), Some((4 + col + row) as f64));
        }
    }
    assert!(result.is_converged());
    assert_eq!(result.rounds(), 2);
    assert_eq!(result.tiles().len(), 2);
}

#[test]
fn test_single_tile_matches_direct_kernel_run() {
    let layer = random_layer(11, 1, 1, (12, 9));
    let sources = [(1, 1), (10, 7), (6, 0)];
    let points: Vec<_> = sources.iter().map(|&(c, r)| cell_center(c, r)).collect();

    let config = unit_config().with_max_cost(20.0);
    let result = CostDistance::new(&layer, config)
        .and_then(|driver| driver.run(&points))
        .expect("run succeeds");

    let friction = layer.get(TileKey::new(0, 0)).expect("tile exists");
    let seeds: CostQueue = sources
        .iter()
        .map(|&(c, r)| BoundaryEntry::source(c, r, friction.get(c, r)))
        .collect();
    let params = KernelParams {
        max_cost: 20.0,
        ..KernelParams::unbounded(1.0)
    };
    let direct = relax_tile(friction, &TileData::unreached(12, 9), seeds, &params);

    assert_eq!(result.tile(TileKey::new(0, 0)), Some(&direct.cost));
    assert_eq!(result.rounds(), 1);
}

#[test]
fn test_distributed_matches_stitched_grid() {
    for seed in [1_u64, 2, 3, 4] {
        let layer = random_layer(seed, 3, 2, (5, 4));
        let sources = [(0, 0), (13, 6), (7, 3)];
        let points: Vec<_> = sources.iter().map(|&(c, r)| cell_center(c, r)).collect();

        let result = CostDistance::new(&layer, unit_config())
            .and_then(|driver| driver.run(&points))
            .expect("run succeeds");
        assert!(result.is_converged());

        let expected = global_cost(&layer, &sources, &KernelParams::unbounded(1.0));
        for key in layer.layout().bounds().keys() {
            let tile = result.tile(key).expect("every key has a cost tile");
            for row in 0..4 {
                for col in 0..5 {
                    let global = expected.get(key.col as usize * 5 + col, key.row as usize * 4 + row);
                    let local = tile.get(col, row);
                    if global.is_finite() {
                        assert_relative_eq!(local, global, max_relative = 1e-9);
                    } else {
                        assert!(!local.is_finite(), "seed {seed}: {key} ({col}, {row}) reached");
                    }
                }
            }
        }
    }
}

#[test]
fn test_bound_enforcement() {
    let layer = random_layer(21, 3, 3, (6, 6));
    let points = [cell_center(8, 8)];
    let bounded = CostDistance::new(&layer, unit_config().with_max_cost(9.0))
        .and_then(|driver| driver.run(&points))
        .expect("run succeeds");
    let unbounded = CostDistance::new(&layer, unit_config())
        .and_then(|driver| driver.run(&points))
        .expect("run succeeds");

    for (key, tile) in unbounded.tiles() {
        let limited = bounded.tile(*key).expect("same partitioning");
        for (full, cut) in tile.as_slice().iter().zip(limited.as_slice()) {
            if *full <= 9.0 {
                assert_relative_eq!(*cut, *full, max_relative = 1e-12);
            } else {
                assert!(cut.is_infinite(), "cost {cut} past the bound");
            }
        }
    }
}

#[test]
fn test_no_sources_means_no_rounds() {
    let layer = random_layer(5, 2, 2, (4, 4));
    let result = CostDistance::new(&layer, unit_config())
        .and_then(|driver| driver.run(&[]))
        .expect("run succeeds");
    assert_eq!(result.rounds(), 0);
    assert!(result.is_converged());
    assert_eq!(result.tiles().len(), 4);
    assert!(result.tiles().values().all(|tile| tile.reached_count() == 0));
}

#[test]
fn test_uniform_friction_terminates_within_diameter() {
    let layer = layer_from_fn(4, 3, 5, 5, |_, _| 1.0);
    let diameter = layer.layout().bounds().diameter() as usize;

    for sources in [vec![cell_center(0, 0)], vec![cell_center(19, 14), cell_center(7, 6)]] {
        let result = CostDistance::new(&layer, unit_config())
            .and_then(|driver| driver.run(&sources))
            .expect("run succeeds");
        assert!(result.is_converged());
        assert!(
            result.rounds() <= diameter + 1,
            "{} rounds for diameter {diameter}",
            result.rounds()
        );
    }
}

#[test]
fn test_costs_never_increase_across_rounds() {
    let layer = random_layer(33, 4, 2, (5, 5));
    let points = [cell_center(2, 2), cell_center(17, 8), cell_center(11, 0)];
    let driver = CostDistance::new(&layer, unit_config()).expect("valid config");

    let mut snapshots: Vec<Vec<(TileKey, Vec<f64>)>> = Vec::new();
    let mut reported_rounds = Vec::new();
    let result = driver
        .run_with_observer(&points, |report, generation| {
            reported_rounds.push(report.round);
            assert_eq!(report.round, generation.index());
            let mut snapshot: Vec<_> = generation
                .tiles()
                .iter()
                .map(|(key, tile)| (*key, tile.as_slice().to_vec()))
                .collect();
            snapshot.sort_by_key(|(key, _)| *key);
            snapshots.push(snapshot);
        })
        .expect("run succeeds");

    assert_eq!(reported_rounds, (1..=result.rounds()).collect::<Vec<_>>());
    for pair in snapshots.windows(2) {
        for ((key, before), (_, after)) in pair[0].iter().zip(&pair[1]) {
            for (b, a) in before.iter().zip(after) {
                if b.is_finite() {
                    assert!(a <= b, "{key}: cost rose from {b} to {a}");
                }
                assert!(*a >= 0.0);
            }
        }
    }
}

#[test]
fn test_parallel_and_sequential_agree() {
    let layer = random_layer(44, 3, 3, (7, 5));
    let points = [cell_center(3, 3), cell_center(18, 12)];
    let parallel = CostDistance::new(&layer, unit_config())
        .and_then(|driver| driver.run(&points))
        .expect("run succeeds");
    let sequential = CostDistance::new(&layer, unit_config().sequential())
        .and_then(|driver| driver.run(&points))
        .expect("run succeeds");

    assert_eq!(parallel.rounds(), sequential.rounds());
    assert_eq!(parallel.tiles(), sequential.tiles());
}

#[test]
fn test_impassable_wall_blocks_propagation() {
    // Column 6 (first column of the second tile) is a wall
    let layer = layer_from_fn(2, 2, 6, 6, |c, _| if c == 6 { -1.0 } else { 1.0 });
    let result = CostDistance::new(&layer, unit_config())
        .and_then(|driver| driver.run(&[cell_center(0, 0)]))
        .expect("run succeeds");

    assert_eq!(result.cost_at(TileKey::new(0, 1), 5, 5), Some(16.0));
    for key in [TileKey::new(1, 0), TileKey::new(1, 1)] {
        assert_eq!(result.tile(key).map(TileData::reached_count), Some(0));
    }
}

#[test]
fn test_eight_connectivity_never_beats_the_stitched_grid() {
    let layer = layer_from_fn(2, 2, 6, 6, |_, _| 1.0);
    let config = unit_config().with_connectivity(Connectivity::Eight);
    let result = CostDistance::new(&layer, config)
        .and_then(|driver| driver.run(&[cell_center(1, 1)]))
        .expect("run succeeds");

    let params = KernelParams {
        connectivity: Connectivity::Eight,
        ..KernelParams::unbounded(1.0)
    };
    let expected = global_cost(&layer, &[(1, 1)], &params);
    for key in layer.layout().bounds().keys() {
        let tile = result.tile(key).expect("every key has a cost tile");
        for row in 0..6 {
            for col in 0..6 {
                let global = expected.get(key.col as usize * 6 + col, key.row as usize * 6 + row);
                let local = tile.get(col, row);
                assert!(local >= global - 1e-9, "{key} ({col}, {row}): {local} < {global}");
                if key == TileKey::new(0, 0) {
                    assert_relative_eq!(local, global, max_relative = 1e-12);
                }
            }
        }
    }
}
