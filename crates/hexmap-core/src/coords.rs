//! Hex coordinate types and direction arithmetic.
//! Cube coordinates are stored as (x, z); y is always derived as −x−z.

use serde::{Deserialize, Serialize};

/// Distance from a cell centre to its corners, in world units.
pub const OUTER_RADIUS: f32 = 10.0;
/// Distance from a cell centre to the middle of each edge.
pub const INNER_RADIUS: f32 = OUTER_RADIUS * 0.866_025_4;

/// One of the six edges of a pointy-top hex, clockwise from north-east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HexDirection {
    NE = 0,
    E = 1,
    SE = 2,
    SW = 3,
    W = 4,
    NW = 5,
}

impl HexDirection {
    /// All directions in index order.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::NE,
        HexDirection::E,
        HexDirection::SE,
        HexDirection::SW,
        HexDirection::W,
        HexDirection::NW,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction for an index; wraps modulo 6.
    #[inline]
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % 6]
    }

    #[inline]
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    #[inline]
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[inline]
    pub fn previous(self) -> Self {
        Self::from_index(self.index() + 5)
    }

    #[inline]
    pub fn next2(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    #[inline]
    pub fn previous2(self) -> Self {
        Self::from_index(self.index() + 4)
    }
}

/// A cell position in cube coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoordinates {
    pub x: i32,
    pub z: i32,
}

impl HexCoordinates {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    #[inline]
    pub fn y(&self) -> i32 {
        -self.x - self.z
    }

    /// Convert an offset (column, row) position to cube coordinates.
    /// Odd rows are shifted half a cell to the east.
    pub fn from_offset(col: i32, row: i32) -> Self {
        Self::new(col - row.div_euclid(2), row)
    }

    /// Hex distance in cells.
    ///
    /// `wrap_size` is the map width in cells when the map wraps east-west;
    /// the shorter of the direct and the seam-crossing routes is returned.
    pub fn distance_to(self, other: HexCoordinates, wrap_size: Option<i32>) -> u32 {
        let mut xy = self.xy_distance(other);
        if let Some(size) = wrap_size {
            let east = self.xy_distance(HexCoordinates::new(other.x + size, other.z));
            let west = self.xy_distance(HexCoordinates::new(other.x - size, other.z));
            xy = xy.min(east).min(west);
        }
        (xy + (self.z - other.z).unsigned_abs()) / 2
    }

    fn xy_distance(self, other: HexCoordinates) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y() - other.y()).unsigned_abs()
    }
}

impl std::fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y(), self.z)
    }
}

/// Planar world position (x, z) of the cell at offset (col, row).
pub fn cell_position(col: usize, row: usize) -> (f32, f32) {
    let x = (col as f32 + row as f32 * 0.5 - (row / 2) as f32) * (INNER_RADIUS * 2.0);
    let z = row as f32 * (OUTER_RADIUS * 1.5);
    (x, z)
}
