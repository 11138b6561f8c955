//! Procedural hex-map generation.
//!
//! Pipeline (one seeded run, see [`generator::MapGenerator`]):
//!   regions → land sculpting → erosion → climate → rivers → roads →
//!   biomes → towns → farms → walls.
//!
//! The finished grid can be exported as a [`snapshot::MapSnapshot`] or
//! queried with [`pathfinding::find_path`].

pub mod climate;
pub mod config;
pub mod coords;
pub mod error;
pub mod generator;
pub mod grid;
pub mod hydrology;
pub mod pathfinding;
pub mod queue;
pub mod settlement;
pub mod snapshot;
pub mod terrain;
pub mod weighted;

pub use config::{GeneratorConfig, HemisphereMode};
pub use coords::{HexCoordinates, HexDirection};
pub use error::{MapError, Result};
pub use generator::{GeneratedMap, GenerationReport, MapGenerator};
pub use grid::{Cell, CellId, EdgeType, HexGrid, TerrainType};
pub use pathfinding::{find_path, UnitPath};
pub use queue::CellPriorityQueue;
pub use snapshot::{CellRecord, MapSnapshot};
