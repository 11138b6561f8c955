//! River and lake placement.
//!
//! Rivers start on wet highland cells and wander downhill, preferring steep
//! drops and avoiding hairpin turns, until they reach water, merge into an
//! existing river, or dead-end in a new lake.

use rand::rngs::StdRng;
use rand::Rng;

use crate::climate::ClimateData;
use crate::config::{percentage_of, GeneratorConfig};
use crate::coords::HexDirection;
use crate::grid::{CellId, HexGrid};
use crate::weighted::{pick_direction, WeightedPool};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RiverOutcome {
    pub budget: usize,
    pub budget_remaining: usize,
    pub rivers: usize,
}

/// Origin weight for a dry-land cell: 0-4 copies in the origin pool.
fn origin_weight(grid: &HexGrid, config: &GeneratorConfig, id: CellId, moisture: f32) -> u32 {
    let cell = grid.cell(id);
    let w = moisture * (cell.elevation() - config.water_level) as f32
        / (config.elevation_maximum - config.water_level) as f32;
    u32::from(w > 0.25) + u32::from(w > 0.5) + 2 * u32::from(w > 0.75)
}

/// Place rivers until `river_percentage` of the land is covered by river
/// segments or no origin candidates remain.
pub fn create_rivers(
    grid: &mut HexGrid,
    rng: &mut StdRng,
    config: &GeneratorConfig,
    climate: &[ClimateData],
    land_cells: usize,
) -> RiverOutcome {
    let mut origins = WeightedPool::from_weights(
        (0..grid.len())
            .filter(|&id| !grid.cell(id).is_underwater())
            .map(|id| (id, origin_weight(grid, config, id, climate[id].moisture))),
    );

    let budget = percentage_of(land_cells, config.river_percentage);
    let mut remaining = budget;
    let mut rivers = 0;
    while remaining > 0 {
        let Some(origin) = origins.take(rng) else {
            break;
        };
        if grid.cell(origin).has_river() || !is_clear_origin(grid, origin) {
            continue;
        }
        let length = create_river(grid, rng, config, origin);
        if length > 0 {
            rivers += 1;
        }
        remaining = remaining.saturating_sub(length);
    }

    if remaining > 0 {
        tracing::warn!(budget_remaining = remaining, budget, "failed to use up river budget");
    }
    RiverOutcome { budget, budget_remaining: remaining, rivers }
}

/// No neighbour may carry a river or be underwater.
fn is_clear_origin(grid: &HexGrid, id: CellId) -> bool {
    grid.cell(id).neighbor_ids().into_iter().flatten().all(|n| {
        let cell = grid.cell(n);
        !cell.has_river() && !cell.is_underwater()
    })
}

/// Grow one river from `origin`. Returns its length in cells, or 0 if it
/// could not leave the origin.
pub fn create_river(
    grid: &mut HexGrid,
    rng: &mut StdRng,
    config: &GeneratorConfig,
    origin: CellId,
) -> usize {
    let mut length = 1;
    let mut cell = origin;
    let mut direction = HexDirection::NE;

    for _ in 0..grid.len() {
        if grid.cell(cell).is_underwater() {
            break;
        }
        let elevation = grid.cell(cell).elevation();
        let mut min_neighbor_elevation = i32::MAX;
        let mut weights = [0u32; 6];

        for d in HexDirection::ALL {
            let Some(n) = grid.neighbor(cell, d) else {
                continue;
            };
            let neighbor = grid.cell(n);
            min_neighbor_elevation = min_neighbor_elevation.min(neighbor.elevation());

            if n == origin || neighbor.incoming_river().is_some() {
                continue;
            }
            let delta = neighbor.elevation() - elevation;
            if delta > 0 {
                continue;
            }
            if neighbor.outgoing_river().is_some() {
                // Another river's source: join it.
                grid.set_outgoing_river(cell, d);
                return length;
            }

            let w = &mut weights[d.index()];
            if delta < 0 {
                *w += 3;
            }
            if length == 1 || (d != direction.next2() && d != direction.previous2()) {
                *w += 1;
            }
            *w += 1;
        }

        let Some(chosen) = pick_direction(rng, &weights) else {
            if length == 1 {
                return 0;
            }
            if min_neighbor_elevation >= elevation {
                grid.set_water_level(cell, min_neighbor_elevation);
                if min_neighbor_elevation == elevation {
                    grid.set_elevation(cell, min_neighbor_elevation - 1);
                }
            }
            break;
        };

        direction = chosen;
        grid.set_outgoing_river(cell, direction);
        length += 1;

        if min_neighbor_elevation >= elevation && rng.gen::<f32>() < config.extra_lake_probability {
            grid.set_water_level(cell, elevation);
            grid.set_elevation(cell, elevation - 1);
        }

        match grid.neighbor(cell, direction) {
            Some(n) => cell = n,
            None => break,
        }
    }
    length
}
