//! Distributed fixed-point driver
//!
//! Runs the tile kernel in synchronized rounds until no tile has anything
//! left to tell its neighbors.
//!
//! # Rounds
//!
//! 1. **Seed**: every source point inside a tile's extent becomes a zero-cost
//!    entry for that tile; every cost tile starts all-unreached.
//! 2. **Round**: the aggregator is drained into a read-only map of entries
//!    per destination tile. Every tile with entries is relaxed (in parallel)
//!    against its cost from the previous generation; every other tile is
//!    carried forward. Edge cells that changed become updates for the tile
//!    across that edge, unless that tile is past the edge of the dataset.
//!    Once the new generation is complete the previous one is released, and
//!    updates that would not lower any cell of their destination are pruned.
//! 3. **Terminate** when a round leaves no update pending.
//!
//! A generation is never written after it is published; the next one shares
//! unchanged tiles with it through `Arc` and owns the rest.

use super::aggregator::{RoundAggregator, UpdateMap};
use super::kernel::{entry_improves, relax_tile, KernelOutput, KernelParams, KernelStats};
use super::profiler::ProfilerScope;
use super::resolution::estimate_resolution;
use crate::config::CostDistanceConfig;
use crate::core_types::{BoundaryEntry, GeoPoint, PendingUpdate, TileKey};
use crate::error::{CostDistanceError, Result};
use crate::grid::{is_passable, CostTile, FrictionTile, KeyedTile, TileData, TileLayout};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Read-only friction input: tiles plus their layout
#[derive(Debug, Clone)]
pub struct FrictionLayer<L> {
    layout: L,
    tiles: FxHashMap<TileKey, FrictionTile>,
}

impl<L: TileLayout> FrictionLayer<L> {
    /// Create a layer with no tiles
    #[must_use]
    pub fn new(layout: L) -> Self {
        Self {
            layout,
            tiles: FxHashMap::default(),
        }
    }

    /// Build a layer from any keyed tiles, copying their cells
    ///
    /// # Errors
    ///
    /// See [`FrictionLayer::insert`]
    pub fn from_tiles<I, K>(layout: L, tiles: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: KeyedTile,
    {
        let mut layer = Self::new(layout);
        for keyed in tiles {
            layer.insert(keyed.key(), TileData::from_raster(keyed.tile()))?;
        }
        Ok(layer)
    }

    /// Add or replace the tile at `key`, returning the replaced tile
    ///
    /// # Errors
    ///
    /// [`CostDistanceError::TileOutsideBounds`] if `key` is outside the
    /// layout's bounds and [`CostDistanceError::TileDimensionMismatch`] if the
    /// tile is not the layout's tile size.
    pub fn insert(&mut self, key: TileKey, tile: FrictionTile) -> Result<Option<FrictionTile>> {
        let bounds = self.layout.bounds();
        if !bounds.contains(key) {
            return Err(CostDistanceError::TileOutsideBounds { key, bounds });
        }
        let (expected_cols, expected_rows) = (self.layout.tile_cols(), self.layout.tile_rows());
        if tile.cols() != expected_cols || tile.rows() != expected_rows {
            return Err(CostDistanceError::TileDimensionMismatch {
                key,
                expected_cols,
                expected_rows,
                actual_cols: tile.cols(),
                actual_rows: tile.rows(),
            });
        }
        Ok(self.tiles.insert(key, tile))
    }

    /// Tile layout
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// All friction tiles
    pub fn tiles(&self) -> &FxHashMap<TileKey, FrictionTile> {
        &self.tiles
    }

    /// Friction tile at `key`
    pub fn get(&self, key: TileKey) -> Option<&FrictionTile> {
        self.tiles.get(&key)
    }

    /// Whether a tile exists at `key`
    pub fn contains(&self, key: TileKey) -> bool {
        self.tiles.contains_key(&key)
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the layer has no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// One round's complete, published set of cost tiles
#[derive(Debug, Clone)]
pub struct Generation {
    index: usize,
    tiles: FxHashMap<TileKey, Arc<CostTile>>,
}

impl Generation {
    fn unreached<L: TileLayout>(layer: &FrictionLayer<L>) -> Self {
        let blank = Arc::new(CostTile::unreached(
            layer.layout().tile_cols(),
            layer.layout().tile_rows(),
        ));
        Self {
            index: 0,
            tiles: layer.tiles().keys().map(|key| (*key, Arc::clone(&blank))).collect(),
        }
    }

    /// Rounds completed when this generation was published (0 = initial)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cost tiles of this generation
    pub fn tiles(&self) -> &FxHashMap<TileKey, Arc<CostTile>> {
        &self.tiles
    }

    /// Cost tile at `key`
    pub fn get(&self, key: TileKey) -> Option<&CostTile> {
        self.tiles.get(&key).map(Arc::as_ref)
    }

    fn into_tiles(self) -> FxHashMap<TileKey, CostTile> {
        self.tiles
            .into_iter()
            .map(|(key, tile)| (key, Arc::unwrap_or_clone(tile)))
            .collect()
    }
}

/// Summary of one completed round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundReport {
    /// 1-based round number
    pub round: usize,
    /// Tiles the kernel ran on
    pub tiles_relaxed: usize,
    /// Updates forwarded to in-bounds neighbors
    pub updates_emitted: usize,
    /// Forwarded updates dropped because they cannot lower any cell
    pub updates_pruned: usize,
    /// Updates carried into the next round
    pub updates_pending: usize,
    /// Summed kernel counters
    pub kernel: KernelStats,
    /// Wall-clock time of the round
    pub elapsed: Duration,
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A round produced no updates
    Converged,
    /// The time budget ran out with updates still pending; the result is the
    /// last complete generation
    TimeBudgetExhausted,
}

/// Cost-distance output with the same layout and keys as the friction input
#[derive(Debug, Clone)]
pub struct CostDistanceLayer<L> {
    layout: L,
    tiles: FxHashMap<TileKey, CostTile>,
    rounds: usize,
    termination: Termination,
    resolution: f64,
}

impl<L> CostDistanceLayer<L> {
    /// Tile layout (shared with the input)
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// All cost tiles
    pub fn tiles(&self) -> &FxHashMap<TileKey, CostTile> {
        &self.tiles
    }

    /// Cost tile at `key`
    pub fn tile(&self, key: TileKey) -> Option<&CostTile> {
        self.tiles.get(&key)
    }

    /// Finite cost of a cell, `None` if unreached or the tile does not exist
    pub fn cost_at(&self, key: TileKey, col: usize, row: usize) -> Option<f64> {
        self.tiles
            .get(&key)
            .map(|tile| tile.get(col, row))
            .filter(|cost| cost.is_finite())
    }

    /// Rounds run
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Why the run stopped
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Whether the run reached the fixed point
    pub fn is_converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Ground resolution used
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Take the cost tiles
    pub fn into_tiles(self) -> FxHashMap<TileKey, CostTile> {
        self.tiles
    }
}

/// Round driver over one friction layer
pub struct CostDistance<'a, L> {
    layer: &'a FrictionLayer<L>,
    config: CostDistanceConfig,
}

impl<'a, L: TileLayout + Clone> CostDistance<'a, L> {
    /// Create a driver
    ///
    /// # Errors
    ///
    /// Returns the error of [`CostDistanceConfig::validate`]
    pub fn new(layer: &'a FrictionLayer<L>, config: CostDistanceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { layer, config })
    }

    /// Configuration in use
    pub fn config(&self) -> &CostDistanceConfig {
        &self.config
    }

    /// Compute cost-distance from `sources`
    ///
    /// # Errors
    ///
    /// See [`CostDistance::run_with_observer`]
    pub fn run(&self, sources: &[GeoPoint]) -> Result<CostDistanceLayer<L>> {
        self.run_with_observer(sources, |_, _| {})
    }

    /// Compute cost-distance from `sources`, calling `observer` after every
    /// round with the round's report and the generation it published.
    ///
    /// # Errors
    ///
    /// Resolution estimation errors when no resolution is configured, and
    /// [`CostDistanceError::RoundLimitExceeded`] if `max_rounds` rounds pass
    /// without a fixed point.
    pub fn run_with_observer<F>(
        &self,
        sources: &[GeoPoint],
        mut observer: F,
    ) -> Result<CostDistanceLayer<L>>
    where
        F: FnMut(&RoundReport, &Generation),
    {
        let started = Instant::now();
        let resolution = match self.config.resolution {
            Some(resolution) => resolution,
            None => estimate_resolution(self.layer.layout(), self.layer.tiles())?,
        };
        let params = KernelParams {
            max_cost: self.config.max_cost_bound(),
            resolution,
            connectivity: self.config.connectivity,
        };

        let mut current = Generation::unreached(self.layer);
        let mut aggregator = self.seed(sources, &params);
        info!(
            tiles = self.layer.len(),
            sources = sources.len(),
            seeds = aggregator.len(),
            resolution,
            max_cost = params.max_cost,
            "starting cost-distance run"
        );

        let termination = loop {
            if aggregator.is_empty() {
                break Termination::Converged;
            }
            if current.index >= self.config.max_rounds {
                warn!(
                    rounds = current.index,
                    pending = aggregator.len(),
                    "round limit reached without a fixed point"
                );
                return Err(CostDistanceError::RoundLimitExceeded {
                    rounds: current.index,
                });
            }

            let scope = ProfilerScope::new("round");
            let updates = aggregator.drain_grouped();
            let (next, fresh, kernel) = self.relax_round(&current, &updates, &params);
            let updates_emitted = fresh.len();

            // `next` is fully built; nothing reads the old generation past here
            let previous = std::mem::replace(&mut current, next);
            drop(previous);

            let updates_pruned = self.prune(&fresh, &current, &params);
            aggregator = fresh;

            let report = RoundReport {
                round: current.index,
                tiles_relaxed: updates.len(),
                updates_emitted,
                updates_pruned,
                updates_pending: aggregator.len(),
                kernel,
                elapsed: scope.elapsed(),
            };
            debug!(
                round = report.round,
                tiles = report.tiles_relaxed,
                accepted = report.kernel.accepted,
                emitted = report.updates_emitted,
                pruned = report.updates_pruned,
                pending = report.updates_pending,
                "round complete"
            );
            observer(&report, &current);

            if let Some(budget) = self.config.time_budget {
                if !aggregator.is_empty() && started.elapsed() >= budget {
                    warn!(
                        rounds = current.index,
                        pending = aggregator.len(),
                        "time budget exhausted, returning last complete generation"
                    );
                    break Termination::TimeBudgetExhausted;
                }
            }
        };

        let rounds = current.index;
        info!(
            rounds,
            ?termination,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "cost-distance run finished"
        );
        Ok(CostDistanceLayer {
            layout: self.layer.layout().clone(),
            tiles: current.into_tiles(),
            rounds,
            termination,
            resolution,
        })
    }

    fn seed(&self, sources: &[GeoPoint], params: &KernelParams) -> RoundAggregator {
        if sources.is_empty() {
            return RoundAggregator::default();
        }
        let aggregator = if self.config.parallel {
            self.layer
                .tiles()
                .par_iter()
                .fold(RoundAggregator::default, |agg, (key, friction)| {
                    self.seed_tile(agg, *key, friction, sources, params)
                })
                .reduce(RoundAggregator::default, RoundAggregator::merge)
        } else {
            self.layer
                .tiles()
                .iter()
                .fold(RoundAggregator::default(), |agg, (key, friction)| {
                    self.seed_tile(agg, *key, friction, sources, params)
                })
        };
        let seeded = aggregator.len();
        if seeded < sources.len() {
            debug!(
                dropped = sources.len() - seeded,
                "source points outside the layer, on impassable cells or past the cost bound"
            );
        }
        aggregator
    }

    fn seed_tile(
        &self,
        aggregator: RoundAggregator,
        key: TileKey,
        friction: &FrictionTile,
        sources: &[GeoPoint],
        params: &KernelParams,
    ) -> RoundAggregator {
        if params.max_cost < 0.0 {
            return aggregator;
        }
        let extent = self.layer.layout().extent(key);
        for point in sources.iter().filter(|point| extent.contains(point)) {
            let (col, row) = extent.cell_of(point, friction.cols(), friction.rows());
            let value = friction.get(col, row);
            if !is_passable(value) {
                trace!(tile = %key, col, row, "source on impassable cell");
                continue;
            }
            aggregator.add(PendingUpdate::new(key, BoundaryEntry::source(col, row, value)));
        }
        aggregator
    }

    fn relax_round(
        &self,
        current: &Generation,
        updates: &UpdateMap,
        params: &KernelParams,
    ) -> (Generation, RoundAggregator, KernelStats) {
        let mut work: Vec<(TileKey, &[BoundaryEntry])> = updates
            .iter()
            .map(|(key, entries)| (*key, entries.as_slice()))
            .collect();
        work.sort_unstable_by_key(|(key, _)| *key);

        let outputs: Vec<(TileKey, KernelOutput)> = if self.config.parallel {
            work.into_par_iter()
                .filter_map(|(key, seeds)| self.relax_one(current, key, seeds, params))
                .collect()
        } else {
            work.into_iter()
                .filter_map(|(key, seeds)| self.relax_one(current, key, seeds, params))
                .collect()
        };

        let fresh = if self.config.parallel {
            outputs
                .par_iter()
                .fold(RoundAggregator::default, |agg, (key, output)| {
                    self.forward(agg, *key, output)
                })
                .reduce(RoundAggregator::default, RoundAggregator::merge)
        } else {
            outputs
                .iter()
                .fold(RoundAggregator::default(), |agg, (key, output)| {
                    self.forward(agg, *key, output)
                })
        };

        let mut stats = KernelStats::default();
        let mut tiles = current.tiles.clone();
        for (key, output) in outputs {
            stats += output.stats;
            tiles.insert(key, Arc::new(output.cost));
        }

        let next = Generation {
            index: current.index + 1,
            tiles,
        };
        (next, fresh, stats)
    }

    fn relax_one(
        &self,
        current: &Generation,
        key: TileKey,
        seeds: &[BoundaryEntry],
        params: &KernelParams,
    ) -> Option<(TileKey, KernelOutput)> {
        let friction = self.layer.get(key)?;
        let prior = current.get(key)?;
        let output = relax_tile(friction, prior, seeds.iter().copied().collect(), params);
        trace!(
            tile = %key,
            seeds = seeds.len(),
            accepted = output.stats.accepted,
            emitted = output.emitted.len(),
            "relaxed tile"
        );
        Some((key, output))
    }

    /// Turn a tile's emitted edge cells into updates for existing, in-bounds
    /// neighbors
    fn forward(&self, aggregator: RoundAggregator, key: TileKey, output: &KernelOutput) -> RoundAggregator {
        let layout = self.layer.layout();
        aggregator.extend(output.emitted.iter().filter_map(|(edge, entry)| {
            let destination = layout.neighbor(key, *edge)?;
            self.layer
                .contains(destination)
                .then_some(PendingUpdate::new(destination, *entry))
        }));
        aggregator
    }

    fn prune(&self, fresh: &RoundAggregator, current: &Generation, params: &KernelParams) -> usize {
        fresh.retain(|update| {
            match (
                self.layer.get(update.destination),
                current.get(update.destination),
            ) {
                (Some(friction), Some(cost)) => entry_improves(&update.entry, friction, cost, params),
                _ => false,
            }
        })
    }
}

/// Cost-distance from `sources` over `layer` with default settings and an
/// optional cost bound.
///
/// # Errors
///
/// See [`CostDistance::run_with_observer`]
pub fn cost_distance<L: TileLayout + Clone>(
    layer: &FrictionLayer<L>,
    sources: &[GeoPoint],
    max_cost: Option<f64>,
) -> Result<CostDistanceLayer<L>> {
    let config = CostDistanceConfig {
        max_cost,
        ..CostDistanceConfig::default()
    };
    CostDistance::new(layer, config)?.run(sources)
}
