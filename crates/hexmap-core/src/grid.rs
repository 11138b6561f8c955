//! Cell arena and neighbour graph.
//!
//! Cells live in a flat row-major `Vec`; neighbours are stored as indices so
//! the graph can be walked and mutated without shared ownership. All river and
//! road edits go through [`HexGrid`] so both sides of an edge stay consistent.

use serde::{Deserialize, Serialize};

use crate::coords::{cell_position, HexCoordinates, HexDirection};
use crate::error::{MapError, Result};

/// Index of a cell in [`HexGrid::cells`].
pub type CellId = usize;

/// Highest plant, urban and farm level a cell can carry.
pub const MAX_FEATURE_LEVEL: u8 = 3;

/// Surface material of a cell, in texture-array order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainType {
    #[default]
    Sand = 0,
    Grass = 1,
    Mud = 2,
    Stone = 3,
    Snow = 4,
}

impl TerrainType {
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Shape of the edge between two adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeType {
    Flat,
    Slope,
    Cliff,
}

impl EdgeType {
    pub fn between(elevation_a: i32, elevation_b: i32) -> Self {
        match (elevation_a - elevation_b).abs() {
            0 => EdgeType::Flat,
            1 => EdgeType::Slope,
            _ => EdgeType::Cliff,
        }
    }
}

/// Per-cell bookkeeping shared by every flood fill and path search.
///
/// `phase` is compared against [`HexGrid::search_phase`]; it is never cleared
/// between searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchData {
    pub distance: u32,
    pub heuristic: u32,
    pub phase: u32,
    pub path_from: Option<CellId>,
    pub(crate) next_with_same_priority: Option<CellId>,
}

impl SearchData {
    #[inline]
    pub fn priority(&self) -> u32 {
        self.distance + self.heuristic
    }
}

/// One hexagonal tile.
#[derive(Debug, Clone)]
pub struct Cell {
    coordinates: HexCoordinates,
    col: usize,
    row: usize,
    elevation: i32,
    water_level: i32,
    terrain: TerrainType,
    plant_level: u8,
    urban_level: u8,
    farm_level: u8,
    walled: bool,
    roads: u8,
    incoming_river: Option<HexDirection>,
    outgoing_river: Option<HexDirection>,
    neighbors: [Option<CellId>; 6],
    pub search: SearchData,
}

impl Cell {
    fn new(col: usize, row: usize) -> Self {
        Self {
            coordinates: HexCoordinates::from_offset(col as i32, row as i32),
            col,
            row,
            elevation: 0,
            water_level: 0,
            terrain: TerrainType::Sand,
            plant_level: 0,
            urban_level: 0,
            farm_level: 0,
            walled: false,
            roads: 0,
            incoming_river: None,
            outgoing_river: None,
            neighbors: [None; 6],
            search: SearchData::default(),
        }
    }

    /// Clear everything except position and neighbours.
    fn reset(&mut self) {
        let neighbors = self.neighbors;
        *self = Cell::new(self.col, self.row);
        self.neighbors = neighbors;
    }

    pub fn coordinates(&self) -> HexCoordinates { self.coordinates }
    pub fn col(&self) -> usize { self.col }
    pub fn row(&self) -> usize { self.row }
    pub fn elevation(&self) -> i32 { self.elevation }
    pub fn water_level(&self) -> i32 { self.water_level }
    pub fn terrain(&self) -> TerrainType { self.terrain }
    pub fn plant_level(&self) -> u8 { self.plant_level }
    pub fn urban_level(&self) -> u8 { self.urban_level }
    pub fn farm_level(&self) -> u8 { self.farm_level }
    pub fn walled(&self) -> bool { self.walled }
    pub fn road_mask(&self) -> u8 { self.roads }
    pub fn incoming_river(&self) -> Option<HexDirection> { self.incoming_river }
    pub fn outgoing_river(&self) -> Option<HexDirection> { self.outgoing_river }

    #[inline]
    pub fn neighbor(&self, direction: HexDirection) -> Option<CellId> {
        self.neighbors[direction.index()]
    }

    /// Neighbour ids in direction order, `None` at the map edge.
    #[inline]
    pub fn neighbor_ids(&self) -> [Option<CellId>; 6] {
        self.neighbors
    }

    #[inline]
    pub fn is_underwater(&self) -> bool {
        self.water_level > self.elevation
    }

    /// The surface height the cell presents: water surface if submerged.
    #[inline]
    pub fn view_elevation(&self) -> i32 {
        self.elevation.max(self.water_level)
    }

    pub fn position(&self) -> (f32, f32) {
        cell_position(self.col, self.row)
    }

    #[inline]
    pub fn has_road_through_edge(&self, direction: HexDirection) -> bool {
        self.roads & (1 << direction.index()) != 0
    }

    #[inline]
    pub fn has_roads(&self) -> bool {
        self.roads != 0
    }

    pub fn road_count(&self) -> u32 {
        self.roads.count_ones()
    }

    pub fn has_river(&self) -> bool {
        self.incoming_river.is_some() || self.outgoing_river.is_some()
    }

    pub fn has_river_through_edge(&self, direction: HexDirection) -> bool {
        self.incoming_river == Some(direction) || self.outgoing_river == Some(direction)
    }
}

/// Flat array of cells plus the search-phase counter.
#[derive(Debug, Clone)]
pub struct HexGrid {
    pub width: usize,
    pub height: usize,
    pub wrap: bool,
    chunk_columns: usize,
    chunk_rows: usize,
    cells: Vec<Cell>,
    searches: u32,
}

impl HexGrid {
    /// Grid without chunk constraints beyond positive dimensions.
    pub fn new(width: usize, height: usize, wrap: bool) -> Result<Self> {
        Self::with_chunks(width, height, wrap, 1, 1)
    }

    /// Build a grid whose size must be a multiple of the chunk size.
    pub fn with_chunks(
        width: usize,
        height: usize,
        wrap: bool,
        chunk_columns: usize,
        chunk_rows: usize,
    ) -> Result<Self> {
        if width == 0
            || height == 0
            || chunk_columns == 0
            || chunk_rows == 0
            || width % chunk_columns != 0
            || height % chunk_rows != 0
        {
            return Err(MapError::InvalidDimensions { width, height, chunk_columns, chunk_rows });
        }

        let mut grid = Self {
            width,
            height,
            wrap,
            chunk_columns,
            chunk_rows,
            cells: Vec::with_capacity(width * height),
            searches: 0,
        };
        for row in 0..height {
            for col in 0..width {
                grid.cells.push(Cell::new(col, row));
            }
        }
        for row in 0..height {
            for col in 0..width {
                grid.link_neighbors(col, row);
            }
        }
        Ok(grid)
    }

    /// Connect a cell to its already-built W, SW and SE neighbours.
    fn link_neighbors(&mut self, col: usize, row: usize) {
        let w = self.width;
        let i = row * w + col;
        if col > 0 {
            self.set_neighbor(i, HexDirection::W, i - 1);
            if self.wrap && col == w - 1 {
                self.set_neighbor(i, HexDirection::E, i - col);
            }
        }
        if row > 0 {
            if row % 2 == 0 {
                self.set_neighbor(i, HexDirection::SE, i - w);
                if col > 0 {
                    self.set_neighbor(i, HexDirection::SW, i - w - 1);
                } else if self.wrap {
                    self.set_neighbor(i, HexDirection::SW, i - 1);
                }
            } else {
                self.set_neighbor(i, HexDirection::SW, i - w);
                if col < w - 1 {
                    self.set_neighbor(i, HexDirection::SE, i - w + 1);
                } else if self.wrap {
                    self.set_neighbor(i, HexDirection::SE, i + 1 - w * 2);
                }
            }
        }
    }

    fn set_neighbor(&mut self, id: CellId, direction: HexDirection, other: CellId) {
        self.cells[id].neighbors[direction.index()] = Some(other);
        self.cells[other].neighbors[direction.opposite().index()] = Some(id);
    }

    /// Restore every cell to its freshly built state; the graph is kept.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
        self.searches = 0;
    }

    // ── Access ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    /// Cell id at offset (col, row), if inside the map.
    pub fn cell_index(&self, col: usize, row: usize) -> Option<CellId> {
        (col < self.width && row < self.height).then(|| row * self.width + col)
    }

    #[inline]
    pub fn neighbor(&self, id: CellId, direction: HexDirection) -> Option<CellId> {
        self.cells[id].neighbor(direction)
    }

    pub fn chunk_count_x(&self) -> usize {
        self.width / self.chunk_columns
    }

    pub fn chunk_count_z(&self) -> usize {
        self.height / self.chunk_rows
    }

    /// Wrap size to pass to [`HexCoordinates::distance_to`].
    pub fn wrap_size(&self) -> Option<i32> {
        self.wrap.then_some(self.width as i32)
    }

    /// Hex distance between two cells, honouring wraparound.
    pub fn distance(&self, a: CellId, b: CellId) -> u32 {
        self.cells[a]
            .coordinates
            .distance_to(self.cells[b].coordinates, self.wrap_size())
    }

    pub fn edge_type(&self, a: CellId, b: CellId) -> EdgeType {
        EdgeType::between(self.cells[a].elevation, self.cells[b].elevation)
    }

    /// True when every existing neighbour carries at least one road.
    pub fn all_neighbors_have_roads(&self, id: CellId) -> bool {
        self.cells[id]
            .neighbors
            .iter()
            .flatten()
            .all(|&n| self.cells[n].has_roads())
    }

    // ── Search bookkeeping ─────────────────────────────────────────────────

    /// Start a new search and return its phase tag.
    ///
    /// Tags are odd while a cell sits in the frontier and `tag + 1` once it is
    /// finalized, so any tag below the returned value means "not yet seen".
    pub fn begin_search(&mut self) -> u32 {
        self.searches += 1;
        self.searches * 2 - 1
    }

    /// Tag of the most recent search, 0 before any search ran.
    pub fn search_phase(&self) -> u32 {
        if self.searches == 0 { 0 } else { self.searches * 2 - 1 }
    }

    /// Zero every cell's phase tag and restart the counter.
    pub fn reset_search_phases(&mut self) {
        for cell in &mut self.cells {
            cell.search.phase = 0;
        }
        self.searches = 0;
    }

    #[inline]
    pub fn search(&self, id: CellId) -> &SearchData {
        &self.cells[id].search
    }

    #[inline]
    pub fn search_mut(&mut self, id: CellId) -> &mut SearchData {
        &mut self.cells[id].search
    }

    // ── Cell mutation ──────────────────────────────────────────────────────

    /// Set elevation, dropping rivers that would now run uphill and roads
    /// that became too steep.
    pub fn set_elevation(&mut self, id: CellId, elevation: i32) {
        if self.cells[id].elevation == elevation {
            return;
        }
        self.cells[id].elevation = elevation;
        self.validate_rivers(id);
        for d in HexDirection::ALL {
            if self.cells[id].has_road_through_edge(d) && self.elevation_difference(id, d) > 1 {
                self.set_road(id, d, false);
            }
        }
    }

    pub fn set_water_level(&mut self, id: CellId, water_level: i32) {
        if self.cells[id].water_level == water_level {
            return;
        }
        self.cells[id].water_level = water_level;
        self.validate_rivers(id);
    }

    pub fn set_terrain(&mut self, id: CellId, terrain: TerrainType) {
        self.cells[id].terrain = terrain;
    }

    pub fn set_plant_level(&mut self, id: CellId, level: u8) {
        self.cells[id].plant_level = level.min(MAX_FEATURE_LEVEL);
    }

    pub fn set_urban_level(&mut self, id: CellId, level: u8) {
        self.cells[id].urban_level = level.min(MAX_FEATURE_LEVEL);
    }

    pub fn set_farm_level(&mut self, id: CellId, level: u8) {
        self.cells[id].farm_level = level.min(MAX_FEATURE_LEVEL);
    }

    pub fn set_walled(&mut self, id: CellId, walled: bool) {
        self.cells[id].walled = walled;
    }

    /// Absolute elevation step to the neighbour in `direction` (0 at the edge).
    pub fn elevation_difference(&self, id: CellId, direction: HexDirection) -> i32 {
        match self.neighbor(id, direction) {
            Some(n) => (self.cells[id].elevation - self.cells[n].elevation).abs(),
            None => 0,
        }
    }

    // ── Rivers ─────────────────────────────────────────────────────────────

    /// A river may flow from `from` into `to` if it does not run uphill, or if
    /// `to` sits exactly at `from`'s lake surface.
    pub fn is_valid_river_destination(&self, from: CellId, to: CellId) -> bool {
        let a = &self.cells[from];
        let b = &self.cells[to];
        a.elevation >= b.elevation || a.water_level == b.elevation
    }

    fn validate_rivers(&mut self, id: CellId) {
        if let Some(d) = self.cells[id].outgoing_river {
            let valid = self
                .neighbor(id, d)
                .is_some_and(|n| self.is_valid_river_destination(id, n));
            if !valid {
                self.remove_outgoing_river(id);
            }
        }
        if let Some(d) = self.cells[id].incoming_river {
            let valid = self
                .neighbor(id, d)
                .is_some_and(|n| self.is_valid_river_destination(n, id));
            if !valid {
                self.remove_incoming_river(id);
            }
        }
    }

    /// Route this cell's river out through `direction`.
    ///
    /// Replaces any previous outgoing river, takes over the neighbour's
    /// incoming slot and removes the road on that edge. Returns false when the
    /// neighbour is missing or uphill.
    pub fn set_outgoing_river(&mut self, id: CellId, direction: HexDirection) -> bool {
        if self.cells[id].outgoing_river == Some(direction) {
            return true;
        }
        let Some(n) = self.neighbor(id, direction) else {
            return false;
        };
        if !self.is_valid_river_destination(id, n) {
            return false;
        }

        self.remove_outgoing_river(id);
        if self.cells[id].incoming_river == Some(direction) {
            self.remove_incoming_river(id);
        }
        self.cells[id].outgoing_river = Some(direction);

        self.remove_incoming_river(n);
        self.cells[n].incoming_river = Some(direction.opposite());

        self.set_road(id, direction, false);
        true
    }

    pub fn remove_outgoing_river(&mut self, id: CellId) {
        if let Some(d) = self.cells[id].outgoing_river.take() {
            if let Some(n) = self.neighbor(id, d) {
                self.cells[n].incoming_river = None;
            }
        }
    }

    pub fn remove_incoming_river(&mut self, id: CellId) {
        if let Some(d) = self.cells[id].incoming_river.take() {
            if let Some(n) = self.neighbor(id, d) {
                self.cells[n].outgoing_river = None;
            }
        }
    }

    // ── Roads ──────────────────────────────────────────────────────────────

    /// Add a road through `direction` if the edge has no river and is not a
    /// cliff. Returns whether a road now exists there.
    pub fn add_road(&mut self, id: CellId, direction: HexDirection) -> bool {
        let cell = &self.cells[id];
        if cell.has_road_through_edge(direction) {
            return true;
        }
        if self.neighbor(id, direction).is_none()
            || cell.has_river_through_edge(direction)
            || self.elevation_difference(id, direction) > 1
        {
            return false;
        }
        self.set_road(id, direction, true);
        true
    }

    fn set_road(&mut self, id: CellId, direction: HexDirection, state: bool) {
        let Some(n) = self.neighbor(id, direction) else {
            return;
        };
        let bit = 1u8 << direction.index();
        let back = 1u8 << direction.opposite().index();
        if state {
            self.cells[id].roads |= bit;
            self.cells[n].roads |= back;
        } else {
            self.cells[id].roads &= !bit;
            self.cells[n].roads &= !back;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Flat land grid with every cell at `elevation` and water level 1.
    pub(crate) fn flat_grid(width: usize, height: usize, elevation: i32) -> HexGrid {
        let mut grid = HexGrid::new(width, height, false).unwrap();
        for id in 0..grid.len() {
            grid.set_water_level(id, 1);
            grid.set_elevation(id, elevation);
        }
        grid
    }

    #[test]
    fn neighbor_graph_is_symmetric() {
        for wrap in [false, true] {
            let grid = HexGrid::new(8, 6, wrap).unwrap();
            for (id, cell) in grid.cells().iter().enumerate() {
                for d in HexDirection::ALL {
                    if let Some(n) = cell.neighbor(d) {
                        assert_eq!(
                            grid.neighbor(n, d.opposite()),
                            Some(id),
                            "wrap={wrap}: cell {id} → {d:?} → {n} is not mirrored"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn interior_cells_have_six_neighbors() {
        let grid = HexGrid::new(6, 6, false).unwrap();
        let id = grid.cell_index(2, 2).unwrap();
        assert_eq!(grid.cell(id).neighbor_ids().iter().flatten().count(), 6);
        let corner = grid.cell_index(0, 0).unwrap();
        assert!(grid.cell(corner).neighbor_ids().iter().flatten().count() < 6);
    }

    #[test]
    fn wrapping_connects_east_and_west_edges() {
        let grid = HexGrid::new(6, 4, true).unwrap();
        for row in 0..4 {
            let west = grid.cell_index(0, row).unwrap();
            let east = grid.cell_index(5, row).unwrap();
            assert_eq!(grid.neighbor(east, HexDirection::E), Some(west));
            for d in HexDirection::ALL {
                if row > 0 && row < 3 {
                    assert!(grid.neighbor(west, d).is_some(), "row {row} west cell missing {d:?}");
                }
            }
        }
    }

    #[test]
    fn odd_row_east_edge_links_to_previous_row_start() {
        for (width, height) in [(6, 4), (30, 20), (2, 2)] {
            let grid = HexGrid::new(width, height, true).unwrap();
            for row in (1..height).step_by(2) {
                let east = grid.cell_index(width - 1, row).unwrap();
                let below_start = grid.cell_index(0, row - 1).unwrap();
                assert_eq!(grid.neighbor(east, HexDirection::SE), Some(below_start), "{width}×{height} row {row}");
                assert_eq!(grid.neighbor(below_start, HexDirection::NW), Some(east));
            }
        }
    }

    #[test]
    fn neighbor_coordinates_are_adjacent() {
        let grid = HexGrid::new(10, 10, false).unwrap();
        for id in 0..grid.len() {
            for n in grid.cell(id).neighbor_ids().iter().flatten() {
                assert_eq!(grid.distance(id, *n), 1);
            }
        }
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            HexGrid::with_chunks(12, 10, false, 5, 5),
            Err(MapError::InvalidDimensions { width: 12, .. })
        ));
        assert!(HexGrid::new(0, 4, false).is_err());
        let grid = HexGrid::with_chunks(20, 15, false, 5, 5).unwrap();
        assert_eq!((grid.chunk_count_x(), grid.chunk_count_z()), (4, 3));
    }

    #[test]
    fn river_sets_both_endpoints() {
        let mut grid = flat_grid(4, 4, 3);
        let a = grid.cell_index(1, 1).unwrap();
        let b = grid.neighbor(a, HexDirection::E).unwrap();
        assert!(grid.set_outgoing_river(a, HexDirection::E));
        assert_eq!(grid.cell(a).outgoing_river(), Some(HexDirection::E));
        assert_eq!(grid.cell(b).incoming_river(), Some(HexDirection::W));
        assert!(grid.cell(a).has_river_through_edge(HexDirection::E));
    }

    #[test]
    fn uphill_river_is_refused_and_raising_target_removes_it() {
        let mut grid = flat_grid(4, 4, 3);
        let a = grid.cell_index(1, 1).unwrap();
        let b = grid.neighbor(a, HexDirection::E).unwrap();
        grid.set_elevation(b, 5);
        assert!(!grid.set_outgoing_river(a, HexDirection::E));

        grid.set_elevation(b, 3);
        assert!(grid.set_outgoing_river(a, HexDirection::E));
        grid.set_elevation(b, 4);
        assert_eq!(grid.cell(a).outgoing_river(), None);
        assert_eq!(grid.cell(b).incoming_river(), None);
    }

    #[test]
    fn lake_surface_keeps_river_valid() {
        let mut grid = flat_grid(4, 4, 3);
        let a = grid.cell_index(1, 1).unwrap();
        let b = grid.neighbor(a, HexDirection::E).unwrap();
        assert!(grid.set_outgoing_river(a, HexDirection::E));
        grid.set_water_level(a, 3);
        grid.set_elevation(a, 2);
        assert_eq!(grid.cell(a).outgoing_river(), Some(HexDirection::E));
        assert_eq!(grid.cell(b).incoming_river(), Some(HexDirection::W));
    }

    #[test]
    fn roads_respect_rivers_and_cliffs() {
        let mut grid = flat_grid(4, 4, 3);
        let a = grid.cell_index(1, 1).unwrap();
        let b = grid.neighbor(a, HexDirection::E).unwrap();
        assert!(grid.add_road(a, HexDirection::E));
        assert!(grid.cell(b).has_road_through_edge(HexDirection::W));

        // A river over the same edge removes the road.
        assert!(grid.set_outgoing_river(a, HexDirection::E));
        assert!(!grid.cell(a).has_road_through_edge(HexDirection::E));
        assert!(!grid.add_road(a, HexDirection::E));

        let c = grid.neighbor(a, HexDirection::SE).unwrap();
        assert!(grid.add_road(a, HexDirection::SE));
        grid.set_elevation(c, 6);
        assert!(!grid.cell(a).has_road_through_edge(HexDirection::SE));
        assert!(!grid.add_road(a, HexDirection::SE));
    }

    #[test]
    fn search_phases_advance_by_two() {
        let mut grid = HexGrid::new(2, 2, false).unwrap();
        assert_eq!(grid.search_phase(), 0);
        assert_eq!(grid.begin_search(), 1);
        assert_eq!(grid.begin_search(), 3);
        grid.search_mut(0).phase = 3;
        grid.reset_search_phases();
        assert_eq!(grid.search(0).phase, 0);
        assert_eq!(grid.begin_search(), 1);
    }

    #[test]
    fn reset_keeps_graph() {
        let mut grid = flat_grid(4, 4, 5);
        grid.set_urban_level(5, 9);
        assert_eq!(grid.cell(5).urban_level(), MAX_FEATURE_LEVEL);
        let before = grid.cell(5).neighbor_ids();
        grid.reset();
        assert_eq!(grid.cell(5).elevation(), 0);
        assert_eq!(grid.cell(5).urban_level(), 0);
        assert_eq!(grid.cell(5).neighbor_ids(), before);
    }
}
