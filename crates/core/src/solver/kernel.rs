//! Tile relaxation kernel
//!
//! Dijkstra-style wavefront relaxation over one tile. The kernel starts from
//! a queue of [`BoundaryEntry`] seeds and the tile's current cost, tightens
//! every cell reachable without exceeding the cost bound, and reports each
//! edge cell whose cost changed so the driver can forward it to the tile
//! across that edge.
//!
//! # Step cost
//!
//! Moving from cell `a` to neighbor `b` costs
//!
//! ```text
//! (friction(a) + friction(b)) / 2 × resolution × step_length
//! ```
//!
//! where `step_length` is 1 for orthogonal steps and √2 for diagonal steps.
//!
//! # Tile edges
//!
//! An entry that arrives from an adjacent tile sits just outside this tile
//! (one coordinate is `-1` or the tile size). It is never written to the cost
//! tile; it only pushes the in-tile cells adjacent to it. Tiles that touch at
//! a corner never exchange entries, so with [`Connectivity::Eight`] the
//! diagonal step across a tile corner is not propagated.

use super::queue::CostQueue;
use crate::core_types::{local_cell, BoundaryEntry, Edge};
use crate::grid::{is_passable, CostTile, FrictionTile};
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

const ORTHOGONAL: [(i64, i64, f64); 4] = [(1, 0, 1.0), (0, 1, 1.0), (-1, 0, 1.0), (0, -1, 1.0)];

const WITH_DIAGONALS: [(i64, i64, f64); 8] = [
    (1, 0, 1.0),
    (0, 1, 1.0),
    (-1, 0, 1.0),
    (0, -1, 1.0),
    (1, 1, SQRT_2),
    (-1, 1, SQRT_2),
    (1, -1, SQRT_2),
    (-1, -1, SQRT_2),
];

/// Cell neighborhood used by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Orthogonal neighbors only
    #[default]
    Four,
    /// Orthogonal and diagonal neighbors
    Eight,
}

impl Connectivity {
    /// `(d_col, d_row, step_length)` of every neighbor
    #[must_use]
    pub fn offsets(self) -> &'static [(i64, i64, f64)] {
        match self {
            Connectivity::Four => &ORTHOGONAL,
            Connectivity::Eight => &WITH_DIAGONALS,
        }
    }
}

/// Scalar inputs of one kernel invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    /// Largest cost propagated
    pub max_cost: f64,
    /// Ground distance per cell
    pub resolution: f64,
    /// Neighborhood
    pub connectivity: Connectivity,
}

impl KernelParams {
    /// Unbounded, unit-resolution, 4-connected parameters
    #[must_use]
    pub fn unbounded(resolution: f64) -> Self {
        Self {
            max_cost: f64::INFINITY,
            resolution,
            connectivity: Connectivity::Four,
        }
    }
}

/// Work counters of one kernel invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelStats {
    /// Entries taken off the queue
    pub popped: usize,
    /// Cells whose cost was lowered
    pub accepted: usize,
    /// Entries skipped because the cell already held a cost at least as low
    pub stale: usize,
    /// Neighbor candidates pushed onto the queue
    pub pushed: usize,
}

impl std::ops::AddAssign for KernelStats {
    fn add_assign(&mut self, rhs: Self) {
        self.popped += rhs.popped;
        self.accepted += rhs.accepted;
        self.stale += rhs.stale;
        self.pushed += rhs.pushed;
    }
}

/// Result of one kernel invocation
#[derive(Debug, Clone)]
pub struct KernelOutput {
    /// New cost tile
    pub cost: CostTile,
    /// Changed edge cells, expressed in the frame of the tile across `Edge`
    pub emitted: Vec<(Edge, BoundaryEntry)>,
    /// Work counters
    pub stats: KernelStats,
}

/// Relax one tile from `seeds`.
///
/// `prior` is left untouched; the returned tile starts as a copy of it. Every
/// edge cell that was lowered is reported once per edge it lies on, carrying
/// its final cost. With no seeds the output equals `prior` and nothing is
/// emitted.
///
/// # Panics
///
/// Panics if `friction` and `prior` differ in size
#[must_use]
pub fn relax_tile(
    friction: &FrictionTile,
    prior: &CostTile,
    seeds: CostQueue,
    params: &KernelParams,
) -> KernelOutput {
    assert!(friction.same_shape(prior), "Friction and cost tiles differ in size");
    let cols = friction.cols();
    let rows = friction.rows();

    let mut cost = prior.clone();
    let mut stats = KernelStats::default();
    let mut queue = seeds;
    let mut edge_cells = Vec::new();

    while let Some(entry) = queue.pop() {
        stats.popped += 1;
        if entry.cost > params.max_cost {
            continue;
        }

        let from_friction = match entry.local_cell(cols, rows) {
            Some((col, row)) => {
                let here = friction.get(col, row);
                if !is_passable(here) {
                    continue;
                }
                if cost.get(col, row) <= entry.cost {
                    stats.stale += 1;
                    continue;
                }
                // Pops are non-decreasing in cost, so a cell is accepted at most once
                if col == 0 || row == 0 || col + 1 == cols || row + 1 == rows {
                    edge_cells.push((col, row));
                }
                cost.set(col, row, entry.cost);
                stats.accepted += 1;
                here
            }
            None => entry.friction,
        };

        for candidate in neighbor_candidates(&entry, from_friction, friction, params) {
            let (col, row) = (candidate.col as usize, candidate.row as usize);
            if candidate.cost < cost.get(col, row) {
                queue.push(candidate);
                stats.pushed += 1;
            }
        }
    }

    let emitted = edge_cells
        .into_iter()
        .flat_map(|(col, row)| {
            let entry_friction = friction.get(col, row);
            let entry_cost = cost.get(col, row);
            Edge::touching(col, row, cols, rows).map(move |edge| {
                let (ncol, nrow) = edge.crossing_coords(col, row, cols, rows);
                (edge, BoundaryEntry::new(ncol, nrow, entry_friction, entry_cost))
            })
        })
        .collect();

    KernelOutput {
        cost,
        emitted,
        stats,
    }
}

/// Whether delivering `entry` to a tile would lower at least one of its cells.
///
/// This is the exact push condition of [`relax_tile`]; an entry for which it
/// is false leaves the tile unchanged.
#[must_use]
pub fn entry_improves(
    entry: &BoundaryEntry,
    friction: &FrictionTile,
    cost: &CostTile,
    params: &KernelParams,
) -> bool {
    if entry.cost > params.max_cost {
        return false;
    }
    match entry.local_cell(friction.cols(), friction.rows()) {
        Some((col, row)) => is_passable(friction.get(col, row)) && entry.cost < cost.get(col, row),
        None => neighbor_candidates(entry, entry.friction, friction, params)
            .any(|candidate| candidate.cost < cost.get(candidate.col as usize, candidate.row as usize)),
    }
}

/// In-tile, passable neighbors of `entry` with their candidate cost, limited
/// to candidates within the cost bound.
fn neighbor_candidates<'a>(
    entry: &BoundaryEntry,
    from_friction: f64,
    friction: &'a FrictionTile,
    params: &'a KernelParams,
) -> impl Iterator<Item = BoundaryEntry> + 'a {
    let (col, row, base) = (entry.col, entry.row, entry.cost);
    params
        .connectivity
        .offsets()
        .iter()
        .filter_map(move |&(d_col, d_row, step)| {
            let (ncol, nrow) = (col + d_col, row + d_row);
            let (c, r) = local_cell(ncol, nrow, friction.cols(), friction.rows())?;
            let to_friction = friction.get(c, r);
            if !is_passable(to_friction) {
                return None;
            }
            let candidate = base + (from_friction + to_friction) * 0.5 * params.resolution * step;
            (candidate <= params.max_cost)
                .then_some(BoundaryEntry::new(ncol, nrow, to_friction, candidate))
        })
}
