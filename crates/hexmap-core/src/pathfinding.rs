//! Turn-aware unit pathfinding over a generated map.
//!
//! A* on the bucket queue. Movement points are spent per turn; a step that
//! does not fit in the remaining points of the current turn starts the next
//! turn and wastes what was left.

use crate::coords::HexDirection;
use crate::grid::{CellId, EdgeType, HexGrid};
use crate::queue::CellPriorityQueue;

/// A found route with its total cost in movement points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPath {
    /// Cells from start to goal, both included.
    pub cells: Vec<CellId>,
    pub cost: u32,
    pub turns: u32,
}

/// Cost to step from `from` through `direction` into `to`, or `None` if the
/// move is impossible.
pub fn move_cost(grid: &HexGrid, from: CellId, to: CellId, direction: HexDirection) -> Option<u32> {
    if grid.edge_type(from, to) == EdgeType::Cliff {
        return None;
    }
    let a = grid.cell(from);
    let b = grid.cell(to);
    if a.has_road_through_edge(direction) {
        return Some(1);
    }
    if a.walled() != b.walled() {
        return None;
    }
    let base = match grid.edge_type(from, to) {
        EdgeType::Flat => 5,
        _ => 10,
    };
    Some(base + u32::from(b.urban_level()) + u32::from(b.farm_level()) + u32::from(b.plant_level()))
}

/// Cheapest route for a unit with `speed` movement points per turn.
pub fn find_path(
    grid: &mut HexGrid,
    queue: &mut CellPriorityQueue,
    from: CellId,
    to: CellId,
    speed: u32,
) -> Option<UnitPath> {
    if speed == 0 || grid.cell(to).is_underwater() {
        return None;
    }

    let phase = grid.begin_search();
    queue.clear();
    {
        let s = grid.search_mut(from);
        s.phase = phase;
        s.distance = 0;
        s.heuristic = 0;
        s.path_from = None;
    }
    queue.enqueue(grid, from);
    let goal = grid.cell(to).coordinates();
    let wrap = grid.wrap_size();

    let mut found = false;
    while let Some(current) = queue.dequeue(grid) {
        grid.search_mut(current).phase = phase + 1;
        if current == to {
            found = true;
            break;
        }
        let current_distance = grid.search(current).distance;
        let current_turn = current_distance.saturating_sub(1) / speed;

        for d in HexDirection::ALL {
            let Some(n) = grid.neighbor(current, d) else {
                continue;
            };
            if grid.search(n).phase > phase || grid.cell(n).is_underwater() {
                continue;
            }
            let Some(cost) = move_cost(grid, current, n, d) else {
                continue;
            };

            let mut distance = current_distance + cost;
            let turn = (distance - 1) / speed;
            if turn > current_turn {
                distance = turn * speed + cost;
            }

            if grid.search(n).phase < phase {
                let heuristic = grid.cell(n).coordinates().distance_to(goal, wrap);
                let s = grid.search_mut(n);
                s.phase = phase;
                s.distance = distance;
                s.heuristic = heuristic;
                s.path_from = Some(current);
                queue.enqueue(grid, n);
            } else if distance < grid.search(n).distance {
                let old_priority = grid.search(n).priority();
                let s = grid.search_mut(n);
                s.distance = distance;
                s.path_from = Some(current);
                queue.change_priority(grid, n, old_priority);
            }
        }
    }
    queue.clear();

    if !found {
        return None;
    }
    let mut cells = vec![to];
    let mut cursor = to;
    while cursor != from {
        let Some(prev) = grid.search(cursor).path_from else {
            break;
        };
        cells.push(prev);
        cursor = prev;
    }
    cells.reverse();
    let cost = grid.search(to).distance;
    Some(UnitPath { cells, cost, turns: cost.saturating_sub(1) / speed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::flat_grid;

    fn path(grid: &mut HexGrid, from: (usize, usize), to: (usize, usize), speed: u32) -> Option<UnitPath> {
        let a = grid.cell_index(from.0, from.1).unwrap();
        let b = grid.cell_index(to.0, to.1).unwrap();
        let mut queue = CellPriorityQueue::new();
        find_path(grid, &mut queue, a, b, speed)
    }

    #[test]
    fn straight_run_over_flat_land() {
        let mut grid = flat_grid(8, 5, 3);
        let p = path(&mut grid, (0, 2), (5, 2), 100).unwrap();
        assert_eq!(p.cells.len(), 6);
        assert_eq!(p.cost, 25);
        assert_eq!(p.turns, 0);
        for pair in p.cells.windows(2) {
            assert_eq!(grid.distance(pair[0], pair[1]), 1, "path must step between neighbours");
        }
    }

    #[test]
    fn moves_spilling_into_next_turn_waste_points() {
        let mut grid = flat_grid(8, 5, 3);
        // Four flat steps use 20 of 24 points; the fifth starts turn two.
        let p = path(&mut grid, (0, 2), (5, 2), 24).unwrap();
        assert_eq!(p.cost, 24 + 5);
        assert_eq!(p.turns, 1);
    }

    #[test]
    fn roads_are_cheap() {
        let mut grid = flat_grid(8, 5, 3);
        let mut id = grid.cell_index(0, 2).unwrap();
        for _ in 0..5 {
            assert!(grid.add_road(id, HexDirection::E));
            id = grid.neighbor(id, HexDirection::E).unwrap();
        }
        let p = path(&mut grid, (0, 2), (5, 2), 24).unwrap();
        assert_eq!(p.cost, 5);
    }

    #[test]
    fn cliffs_force_a_detour_and_water_is_unreachable() {
        let mut grid = flat_grid(7, 7, 3);
        // A wall of high ground across column 3, open only at the bottom row.
        for row in 0..6 {
            let id = grid.cell_index(3, row).unwrap();
            grid.set_elevation(id, 8);
        }
        let p = path(&mut grid, (1, 1), (5, 1), 1000).unwrap();
        assert!(p.cells.len() > 5, "path went through a cliff");
        assert!(p.cells.iter().all(|&c| grid.cell(c).elevation() == 3));

        let sea = grid.cell_index(6, 6).unwrap();
        grid.set_elevation(sea, 0);
        assert_eq!(path(&mut grid, (1, 1), (6, 6), 1000), None);
    }

    #[test]
    fn repeated_searches_reuse_phase_tags() {
        let mut grid = flat_grid(6, 6, 3);
        let first = path(&mut grid, (0, 0), (5, 5), 50).unwrap();
        let second = path(&mut grid, (0, 0), (5, 5), 50).unwrap();
        assert_eq!(first, second);
        let back = path(&mut grid, (5, 5), (0, 0), 50).unwrap();
        assert_eq!(back.cost, first.cost);
    }
}
