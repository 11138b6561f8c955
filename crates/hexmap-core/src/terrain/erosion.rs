//! Thermal-style erosion: knock down cliffs by moving single elevation units
//! from a high cell onto a much lower neighbour.

use rand::rngs::StdRng;
use rand::Rng;

use crate::coords::HexDirection;
use crate::grid::{CellId, HexGrid};

/// A cell is erodible when some neighbour sits at least two levels below it.
pub fn is_erodible(grid: &HexGrid, id: CellId) -> bool {
    let erodible_elevation = grid.cell(id).elevation() - 2;
    grid.cell(id)
        .neighbor_ids()
        .iter()
        .flatten()
        .any(|&n| grid.cell(n).elevation() <= erodible_elevation)
}

/// Set of cells with O(1) insert, remove, membership and random pick.
#[derive(Debug, Clone)]
pub struct ErodibleSet {
    members: Vec<CellId>,
    slots: Vec<Option<usize>>,
}

impl ErodibleSet {
    pub fn new(cell_count: usize) -> Self {
        Self { members: Vec::new(), slots: vec![None; cell_count] }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.slots[id].is_some()
    }

    pub fn insert(&mut self, id: CellId) {
        if self.slots[id].is_none() {
            self.slots[id] = Some(self.members.len());
            self.members.push(id);
        }
    }

    pub fn remove(&mut self, id: CellId) {
        let Some(slot) = self.slots[id].take() else {
            return;
        };
        self.members.swap_remove(slot);
        if let Some(&moved) = self.members.get(slot) {
            self.slots[moved] = Some(slot);
        }
    }

    pub fn random(&self, rng: &mut StdRng) -> Option<CellId> {
        if self.members.is_empty() {
            None
        } else {
            Some(self.members[rng.gen_range(0..self.members.len())])
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ErosionOutcome {
    pub initial_erodible: usize,
    pub remaining_erodible: usize,
    /// Elevation units moved.
    pub moves: usize,
}

/// Erode until only `100 - erosion_percentage` percent of the initially
/// erodible cells are still erodible.
///
/// Each move lowers one erodible cell by one and raises a random neighbour
/// that is at least two lower, so total elevation is conserved.
pub fn erode_land(grid: &mut HexGrid, rng: &mut StdRng, erosion_percentage: u32) -> ErosionOutcome {
    let mut erodible = ErodibleSet::new(grid.len());
    for id in 0..grid.len() {
        if is_erodible(grid, id) {
            erodible.insert(id);
        }
    }
    let initial_erodible = erodible.len();
    let target = initial_erodible * (100 - erosion_percentage.min(100)) as usize / 100;

    let mut moves = 0;
    while erodible.len() > target {
        let Some(cell) = erodible.random(rng) else {
            break;
        };
        let Some(target_cell) = erosion_target(grid, rng, cell) else {
            erodible.remove(cell);
            continue;
        };

        let elevation = grid.cell(cell).elevation() - 1;
        grid.set_elevation(cell, elevation);
        let target_elevation = grid.cell(target_cell).elevation() + 1;
        grid.set_elevation(target_cell, target_elevation);
        moves += 1;

        if !is_erodible(grid, cell) {
            erodible.remove(cell);
        }
        for n in grid.cell(cell).neighbor_ids().into_iter().flatten() {
            if grid.cell(n).elevation() == elevation + 2 {
                erodible.insert(n);
            }
        }

        if is_erodible(grid, target_cell) {
            erodible.insert(target_cell);
        }
        for n in grid.cell(target_cell).neighbor_ids().into_iter().flatten() {
            if n != cell
                && grid.cell(n).elevation() == target_elevation + 1
                && !is_erodible(grid, n)
            {
                erodible.remove(n);
            }
        }
    }

    tracing::debug!(initial_erodible, remaining = erodible.len(), moves, "erosion finished");
    ErosionOutcome { initial_erodible, remaining_erodible: erodible.len(), moves }
}

/// Random neighbour at least two levels below `id`.
fn erosion_target(grid: &HexGrid, rng: &mut StdRng, id: CellId) -> Option<CellId> {
    let erodible_elevation = grid.cell(id).elevation() - 2;
    let mut candidates = [0; 6];
    let mut count = 0;
    for d in HexDirection::ALL {
        if let Some(n) = grid.neighbor(id, d) {
            if grid.cell(n).elevation() <= erodible_elevation {
                candidates[count] = n;
                count += 1;
            }
        }
    }
    (count > 0).then(|| candidates[rng.gen_range(0..count)])
}
