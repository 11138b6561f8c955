//! Road network: random walks across dry land.

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{percentage_of, GeneratorConfig};
use crate::coords::HexDirection;
use crate::grid::{CellId, HexGrid};
use crate::weighted::{pick_direction, WeightedPool};

use super::BudgetOutcome;

/// Lay roads until `road_percentage` of the land carries road segments.
pub fn create_roads(
    grid: &mut HexGrid,
    rng: &mut StdRng,
    config: &GeneratorConfig,
    land_cells: usize,
) -> BudgetOutcome {
    let mut weighted = Vec::new();
    for id in 0..grid.len() {
        if grid.cell(id).is_underwater() {
            continue;
        }
        let r: f32 = rng.gen();
        let w = u32::from(r > 0.4) + u32::from(r > 0.6) + 2 * u32::from(r > 0.8);
        weighted.push((id, w));
    }
    let mut origins = WeightedPool::from_weights(weighted);

    let budget = percentage_of(land_cells, config.road_percentage);
    let mut remaining = budget;
    let mut placed = 0;
    while remaining > 0 {
        let Some(origin) = origins.take(rng) else {
            break;
        };
        let length = create_road(grid, rng, config, origin);
        if length > 0 {
            placed += 1;
        }
        remaining = remaining.saturating_sub(length);
    }

    if remaining > 0 {
        tracing::warn!(budget_remaining = remaining, budget, "failed to use up road budget");
    }
    BudgetOutcome { budget, budget_remaining: remaining, placed }
}

/// Walk one road from `origin`. Returns the number of cells it touches, or
/// 0 when no first step was possible.
pub fn create_road(
    grid: &mut HexGrid,
    rng: &mut StdRng,
    config: &GeneratorConfig,
    origin: CellId,
) -> usize {
    let max_length = rng.gen_range(config.min_road_length..=config.max_road_length);
    let mut length = 1;
    let mut cell = origin;

    while !grid.cell(cell).is_underwater()
        && !grid.all_neighbors_have_roads(cell)
        && length <= max_length
    {
        let weights = road_weights(grid, cell, origin);
        let Some(direction) = pick_direction(rng, &weights) else {
            if length == 1 {
                return 0;
            }
            break;
        };
        grid.add_road(cell, direction);
        length += 1;
        match grid.neighbor(cell, direction) {
            Some(n) => cell = n,
            None => break,
        }
    }
    length
}

fn road_weights(grid: &HexGrid, id: CellId, origin: CellId) -> [u32; 6] {
    let cell = grid.cell(id);
    let mut weights = [0u32; 6];
    for d in HexDirection::ALL {
        let Some(n) = cell.neighbor(d) else {
            continue;
        };
        let neighbor = grid.cell(n);
        if neighbor.is_underwater()
            || n == origin
            || cell.has_road_through_edge(d)
            || cell.has_river_through_edge(d)
            || (neighbor.elevation() - cell.elevation()).abs() > 1
            || neighbor.walled() != cell.walled()
        {
            continue;
        }

        // Favour straight-ish runs through empty country.
        let flanks_clear = match (cell.neighbor(d.next()), cell.neighbor(d.previous())) {
            (Some(a), Some(b)) => !grid.cell(a).has_roads() && !grid.cell(b).has_roads(),
            _ => false,
        };
        weights[d.index()] = if flanks_clear { 3 } else { 1 };
    }
    weights
}
