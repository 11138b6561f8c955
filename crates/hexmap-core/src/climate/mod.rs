//! Water cycle simulation and biome assignment.
//!
//! The simulation runs a fixed number of double-buffered steps: water
//! evaporates into clouds, clouds precipitate and drift downwind, and ground
//! moisture runs off to lower neighbours or seeps to level ones. The final
//! moisture field feeds river placement and the biome classifier.

pub mod biome;
pub mod temperature;

pub use biome::{classify_terrain, Biome, BIOMES, MOISTURE_BANDS, TEMPERATURE_BANDS};
pub use temperature::{determine_temperature, TemperatureJitter};

use crate::config::GeneratorConfig;
use crate::grid::{CellId, HexGrid};

/// Simulation steps per run.
pub const CLIMATE_CYCLES: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateData {
    pub clouds: f32,
    pub moisture: f32,
}

/// Run [`CLIMATE_CYCLES`] steps and return the per-cell result.
pub fn simulate_climate(grid: &HexGrid, config: &GeneratorConfig) -> Vec<ClimateData> {
    let initial = ClimateData { clouds: 0.0, moisture: config.starting_moisture };
    let mut climate = vec![initial; grid.len()];
    let mut next = vec![ClimateData::default(); grid.len()];

    for _ in 0..CLIMATE_CYCLES {
        step_climate(grid, config, &climate, &mut next);
        std::mem::swap(&mut climate, &mut next);
    }
    climate
}

/// Advance `current` by one step into `next`, clearing `next` first.
pub fn step_climate(
    grid: &HexGrid,
    config: &GeneratorConfig,
    current: &[ClimateData],
    next: &mut [ClimateData],
) {
    next.fill(ClimateData::default());
    for id in 0..grid.len() {
        evolve_cell(grid, config, id, current[id], next);
    }
    for c in next.iter_mut() {
        c.clouds = c.clouds.clamp(0.0, 1.0);
        c.moisture = c.moisture.clamp(0.0, 1.0);
    }
}

fn evolve_cell(
    grid: &HexGrid,
    config: &GeneratorConfig,
    id: CellId,
    mut data: ClimateData,
    next: &mut [ClimateData],
) {
    let cell = grid.cell(id);

    if cell.is_underwater() {
        data.moisture = 1.0;
        data.clouds += config.evaporation_factor;
    } else {
        let evaporation = data.moisture * config.evaporation_factor;
        data.moisture -= evaporation;
        data.clouds += evaporation;
    }

    let precipitation = data.clouds * config.precipitation_factor;
    data.clouds -= precipitation;
    data.moisture += precipitation;

    let cloud_maximum = 1.0 - cell.view_elevation() as f32 / (config.elevation_maximum as f32 + 1.0);
    if data.clouds > cloud_maximum {
        data.moisture += data.clouds - cloud_maximum;
        data.clouds = cloud_maximum;
    }

    let downwind = config.wind_from.opposite();
    let cloud_dispersal = data.clouds / (5.0 + config.wind_strength);
    let runoff = data.moisture * config.runoff_factor / 6.0;
    let seepage = data.moisture * config.seepage_factor / 6.0;
    for (d, n) in crate::coords::HexDirection::ALL.into_iter().zip(cell.neighbor_ids()) {
        let Some(n) = n else {
            continue;
        };
        next[n].clouds += if d == downwind {
            cloud_dispersal * config.wind_strength
        } else {
            cloud_dispersal
        };

        let delta = grid.cell(n).view_elevation() - cell.view_elevation();
        if delta < 0 {
            data.moisture -= runoff;
            next[n].moisture += runoff;
        } else if delta == 0 {
            data.moisture -= seepage;
            next[n].moisture += seepage;
        }
    }

    next[id].moisture = (next[id].moisture + data.moisture).min(1.0);
}
