//! Landmass sculpting by randomized flood fills.
//!
//! Each pass picks a seed cell inside a region and grows a roughly circular
//! patch around it (priority = hex distance to the seed, plus an occasional
//! +1 jitter), raising or sinking every cell it reaches. A land budget counts
//! how many more cells must cross the water level before sculpting stops.

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{percentage_of, GeneratorConfig};
use crate::coords::HexDirection;
use crate::grid::HexGrid;
use crate::queue::CellPriorityQueue;

use super::regions::MapRegion;

/// Upper bound on sculpting sweeps before giving up on the land budget.
pub const LAND_GUARD: usize = 10_000;

/// Result of [`create_land`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LandOutcome {
    /// Land cells requested by `land_percentage`.
    pub target: usize,
    /// Cells at or above water level when sculpting stopped.
    pub land_cells: usize,
    /// Budget left unspent; non-zero only when the sweep guard ran out.
    pub budget_remaining: usize,
    pub sweeps: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reshape {
    Raise,
    Sink,
}

/// Sculpt land until `land_percentage` of the map sits at or above water.
///
/// Every cell must already carry the configured water level. Raising a cell
/// across the water line spends one unit of budget; sinking one back below it
/// refunds a unit, so the budget always equals the land still owed.
pub fn create_land(
    grid: &mut HexGrid,
    queue: &mut CellPriorityQueue,
    rng: &mut StdRng,
    config: &GeneratorConfig,
    regions: &[MapRegion],
) -> LandOutcome {
    let target = percentage_of(grid.len(), config.land_percentage);
    let mut budget = target as i64;
    let mut sweeps = 0;

    'sweeps: while budget > 0 && sweeps < LAND_GUARD {
        sweeps += 1;
        let mode = if rng.gen::<f32>() < config.sink_probability {
            Reshape::Sink
        } else {
            Reshape::Raise
        };
        for region in regions {
            let chunk_size = rng.gen_range(config.chunk_size_min..=config.chunk_size_max);
            budget = reshape(grid, queue, rng, config, region, chunk_size, budget, mode);
            if budget == 0 {
                break 'sweeps;
            }
        }
    }

    let budget_remaining = budget.max(0) as usize;
    if budget_remaining > 0 {
        tracing::warn!(budget_remaining, target, "failed to use up land budget");
    }
    LandOutcome {
        target,
        land_cells: target.saturating_sub(budget_remaining),
        budget_remaining,
        sweeps,
    }
}

/// One flood-fill pass. Returns the updated budget.
#[allow(clippy::too_many_arguments)]
fn reshape(
    grid: &mut HexGrid,
    queue: &mut CellPriorityQueue,
    rng: &mut StdRng,
    config: &GeneratorConfig,
    region: &MapRegion,
    chunk_size: usize,
    mut budget: i64,
    mode: Reshape,
) -> i64 {
    let phase = grid.begin_search();
    let first = region.random_cell(grid, rng);
    {
        let s = grid.search_mut(first);
        s.phase = phase;
        s.distance = 0;
        s.heuristic = 0;
    }
    queue.enqueue(grid, first);
    let center = grid.cell(first).coordinates();
    let wrap = grid.wrap_size();
    let magnitude = if rng.gen::<f32>() < config.high_rise_probability { 2 } else { 1 };
    let water = config.water_level;

    let mut size = 0;
    while size < chunk_size {
        let Some(current) = queue.dequeue(grid) else {
            break;
        };
        let original = grid.cell(current).elevation();
        let updated = match mode {
            Reshape::Raise => original + magnitude,
            Reshape::Sink => original - magnitude,
        };
        if updated > config.elevation_maximum || updated < config.elevation_minimum {
            continue;
        }
        grid.set_elevation(current, updated);

        match mode {
            Reshape::Raise if original < water && updated >= water => {
                budget -= 1;
                if budget == 0 {
                    break;
                }
            }
            Reshape::Sink if original >= water && updated < water => budget += 1,
            _ => {}
        }
        size += 1;

        for d in HexDirection::ALL {
            let Some(n) = grid.neighbor(current, d) else {
                continue;
            };
            if grid.search(n).phase >= phase {
                continue;
            }
            let distance = grid.cell(n).coordinates().distance_to(center, wrap);
            let heuristic = u32::from(rng.gen::<f32>() < config.jitter_probability);
            let s = grid.search_mut(n);
            s.phase = phase;
            s.distance = distance;
            s.heuristic = heuristic;
            queue.enqueue(grid, n);
        }
    }
    queue.clear();
    budget
}
