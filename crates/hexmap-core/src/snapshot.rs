//! Compact, serialisable view of a generated map.
//!
//! Every per-cell field fits in one byte so a snapshot can be written out as
//! JSON for tooling or compared cheaply in determinism tests.

use serde::{Deserialize, Serialize};

use crate::coords::HexDirection;
use crate::grid::{Cell, HexGrid};

/// River byte for "no river"; otherwise `RIVER_FLAG + direction`.
pub const NO_RIVER: u8 = 0;
pub const RIVER_FLAG: u8 = 128;

pub fn pack_river(direction: Option<HexDirection>) -> u8 {
    match direction {
        Some(d) => RIVER_FLAG + d as u8,
        None => NO_RIVER,
    }
}

pub fn unpack_river(byte: u8) -> Option<HexDirection> {
    (byte >= RIVER_FLAG).then(|| HexDirection::from_index((byte - RIVER_FLAG) as usize))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub elevation: i8,
    pub water_level: u8,
    pub terrain: u8,
    pub urban_level: u8,
    pub farm_level: u8,
    pub plant_level: u8,
    pub walled: bool,
    /// Bit `d` set when a road leaves through direction `d`.
    pub roads: u8,
    pub incoming_river: u8,
    pub outgoing_river: u8,
}

impl CellRecord {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            elevation: cell.elevation() as i8,
            water_level: cell.water_level().max(0) as u8,
            terrain: cell.terrain().index(),
            urban_level: cell.urban_level(),
            farm_level: cell.farm_level(),
            plant_level: cell.plant_level(),
            walled: cell.walled(),
            roads: cell.road_mask(),
            incoming_river: pack_river(cell.incoming_river()),
            outgoing_river: pack_river(cell.outgoing_river()),
        }
    }

    pub fn is_underwater(&self) -> bool {
        i32::from(self.water_level) > i32::from(self.elevation)
    }

    pub fn has_river(&self) -> bool {
        self.incoming_river != NO_RIVER || self.outgoing_river != NO_RIVER
    }
}

/// Row-major cell records plus the map shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub width: usize,
    pub height: usize,
    pub wrap: bool,
    pub cells: Vec<CellRecord>,
}

impl MapSnapshot {
    pub fn cell(&self, col: usize, row: usize) -> &CellRecord {
        &self.cells[row * self.width + col]
    }

    pub fn land_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_underwater()).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

impl HexGrid {
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            width: self.width,
            height: self.height,
            wrap: self.wrap,
            cells: self.cells().iter().map(CellRecord::from_cell).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::flat_grid;
    use crate::grid::TerrainType;

    #[test]
    fn river_bytes() {
        assert_eq!(pack_river(None), 0);
        assert_eq!(pack_river(Some(HexDirection::NE)), 128);
        assert_eq!(pack_river(Some(HexDirection::NW)), 133);
        assert_eq!(unpack_river(131), Some(HexDirection::SW));
        assert_eq!(unpack_river(0), None);
    }

    #[test]
    fn snapshot_captures_cell_state() {
        let mut grid = flat_grid(4, 4, 3);
        let a = grid.cell_index(1, 1).unwrap();
        let b = grid.neighbor(a, HexDirection::E).unwrap();
        let c = grid.neighbor(a, HexDirection::SE).unwrap();
        assert!(grid.set_outgoing_river(a, HexDirection::E));
        assert!(grid.add_road(a, HexDirection::SE));
        grid.set_terrain(a, TerrainType::Mud);
        grid.set_urban_level(a, 2);
        grid.set_walled(a, true);
        let sunk = grid.cell_index(3, 3).unwrap();
        grid.set_elevation(sunk, -2);

        let snap = grid.snapshot();
        assert_eq!(snap.cells.len(), 16);
        let rec = snap.cell(1, 1);
        assert_eq!(rec.outgoing_river, RIVER_FLAG + HexDirection::E as u8);
        assert_eq!(rec.roads, 1 << HexDirection::SE.index());
        assert_eq!(rec.terrain, 2);
        assert_eq!(rec.urban_level, 2);
        assert!(rec.walled);
        assert_eq!(snap.cells[b].incoming_river, RIVER_FLAG + HexDirection::W as u8);
        assert_eq!(snap.cells[c].roads, 1 << HexDirection::NW.index());
        assert_eq!(snap.cell(3, 3).elevation, -2);
        assert!(snap.cell(3, 3).is_underwater());
        assert_eq!(snap.land_cells(), 15);
    }

    #[test]
    fn json_keeps_every_field() {
        let mut grid = flat_grid(3, 2, 4);
        grid.set_plant_level(0, 3);
        let snap = grid.snapshot();
        let back = MapSnapshot::from_json(&snap.to_json().unwrap()).unwrap();
        assert_eq!(back, snap);
    }
}
