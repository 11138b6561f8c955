//! Town walls around dense settlements.

use rand::rngs::StdRng;
use rand::Rng;

use crate::grid::{Cell, CellId, HexGrid};

fn is_dense(cell: &Cell) -> bool {
    cell.urban_level() > 1 || (cell.urban_level() == 1 && cell.farm_level() > 1)
}

fn wall(grid: &mut HexGrid, id: CellId) {
    let plant = grid.cell(id).plant_level();
    if plant >= 2 {
        grid.set_plant_level(id, plant - 1);
    }
    grid.set_walled(id, true);
}

/// Wall dense settlements and the settled cells around them, then close
/// gaps between walled cells. Returns the number of walled cells.
pub fn create_walls(grid: &mut HexGrid, rng: &mut StdRng) -> usize {
    for id in 0..grid.len() {
        let cell = grid.cell(id);
        if cell.is_underwater() || cell.walled() {
            continue;
        }
        if is_dense(cell) {
            wall(grid, id);
            continue;
        }
        let settled = cell.urban_level() > 0 || cell.farm_level() > 0;
        let near_dense = cell
            .neighbor_ids()
            .into_iter()
            .flatten()
            .any(|n| is_dense(grid.cell(n)));
        if settled && near_dense {
            wall(grid, id);
        }
    }

    // Gap filling reads the first pass only.
    let mut additional = Vec::new();
    for id in 0..grid.len() {
        let cell = grid.cell(id);
        if cell.is_underwater() || cell.walled() {
            continue;
        }
        let walled_neighbors = cell
            .neighbor_ids()
            .into_iter()
            .flatten()
            .filter(|&n| grid.cell(n).walled())
            .count();
        if walled_neighbors >= 3 || (walled_neighbors == 2 && rng.gen_bool(0.5)) {
            additional.push(id);
        }
    }
    for &id in &additional {
        grid.set_walled(id, true);
    }

    let walled = grid.cells().iter().filter(|c| c.walled()).count();
    tracing::debug!(walled, gap_fill = additional.len(), "walls placed");
    walled
}
