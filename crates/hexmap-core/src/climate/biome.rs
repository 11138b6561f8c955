//! Terrain type and plant level from temperature, moisture and elevation.

use rand::rngs::StdRng;

use crate::config::GeneratorConfig;
use crate::grid::{CellId, HexGrid, TerrainType, MAX_FEATURE_LEVEL};

use super::temperature::{determine_temperature, TemperatureJitter};
use super::ClimateData;

/// Upper bounds of temperature bands 0-2; anything above is band 3.
pub const TEMPERATURE_BANDS: [f32; 3] = [0.1, 0.3, 0.6];
/// Upper bounds of moisture bands 0-2.
pub const MOISTURE_BANDS: [f32; 3] = [0.12, 0.28, 0.85];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Biome {
    pub terrain: TerrainType,
    pub plant: u8,
}

const fn biome(terrain: TerrainType, plant: u8) -> Biome {
    Biome { terrain, plant }
}

/// Row = temperature band, column = moisture band.
pub const BIOMES: [[Biome; 4]; 4] = {
    use TerrainType::*;
    [
        [biome(Sand, 0), biome(Snow, 0), biome(Snow, 0), biome(Snow, 0)],
        [biome(Sand, 0), biome(Mud, 0), biome(Mud, 1), biome(Mud, 2)],
        [biome(Sand, 0), biome(Grass, 0), biome(Grass, 1), biome(Grass, 2)],
        [biome(Sand, 0), biome(Grass, 1), biome(Grass, 2), biome(Grass, 3)],
    ]
};

fn band(value: f32, bounds: &[f32; 3]) -> usize {
    bounds.iter().position(|&b| value < b).unwrap_or(bounds.len())
}

/// Assign terrain to every cell and plants to land cells.
pub fn classify_terrain(
    grid: &mut HexGrid,
    rng: &mut StdRng,
    config: &GeneratorConfig,
    climate: &[ClimateData],
) {
    let jitter = TemperatureJitter::from_rng(rng);
    let rock_desert_elevation = config.rock_desert_elevation();

    for id in 0..grid.len() {
        let temperature = determine_temperature(grid.cell(id), grid.height, config, &jitter);
        if grid.cell(id).is_underwater() {
            let terrain = submerged_terrain(grid, id, config, temperature);
            grid.set_terrain(id, terrain);
            continue;
        }

        let t = band(temperature, &TEMPERATURE_BANDS);
        let m = band(climate[id].moisture, &MOISTURE_BANDS);
        let mut b = BIOMES[t][m];
        let elevation = grid.cell(id).elevation();

        if b.terrain == TerrainType::Sand {
            if elevation >= rock_desert_elevation {
                b.terrain = TerrainType::Stone;
            }
        } else if elevation == config.elevation_maximum {
            b.terrain = TerrainType::Snow;
        }

        if b.terrain == TerrainType::Snow {
            b.plant = 0;
        } else if b.plant < MAX_FEATURE_LEVEL && grid.cell(id).has_river() {
            b.plant += 1;
        }

        grid.set_terrain(id, b.terrain);
        grid.set_plant_level(id, b.plant);
    }
}

fn submerged_terrain(
    grid: &HexGrid,
    id: CellId,
    config: &GeneratorConfig,
    temperature: f32,
) -> TerrainType {
    let cell = grid.cell(id);
    let terrain = if cell.elevation() == config.water_level - 1 {
        // Shallow water: the shore shape decides the seabed.
        let (mut cliffs, mut slopes) = (0, 0);
        for n in cell.neighbor_ids().into_iter().flatten() {
            let delta = grid.cell(n).elevation() - cell.water_level();
            if delta == 0 {
                slopes += 1;
            } else if delta > 0 {
                cliffs += 1;
            }
        }
        if cliffs + slopes > 3 {
            TerrainType::Grass
        } else if cliffs > 0 {
            TerrainType::Stone
        } else if slopes > 0 {
            TerrainType::Sand
        } else {
            TerrainType::Grass
        }
    } else if cell.elevation() >= config.water_level {
        // Raised lake bed.
        TerrainType::Grass
    } else if cell.elevation() < 0 {
        TerrainType::Stone
    } else {
        TerrainType::Mud
    };

    if terrain == TerrainType::Grass && temperature < TEMPERATURE_BANDS[0] {
        TerrainType::Mud
    } else {
        terrain
    }
}
