//! Latitude and altitude based temperature with a small noise jitter.

use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{GeneratorConfig, HemisphereMode};
use crate::grid::Cell;

/// Fixed seed so the jitter field is a property of the map, not of the run.
const JITTER_NOISE_SEED: u32 = 0x4E5A_0001;
/// Extra scale applied after the ×0.1 world-position sampling factor.
const JITTER_NOISE_SCALE: f64 = 0.3;
/// Spacing between channels along the third noise axis.
const CHANNEL_OFFSET: f64 = 31.7;

/// Four-channel noise field; one channel is chosen per run.
pub struct TemperatureJitter {
    perlin: Perlin,
    channel: usize,
}

impl TemperatureJitter {
    pub fn new(channel: usize) -> Self {
        Self { perlin: Perlin::new(JITTER_NOISE_SEED), channel: channel % 4 }
    }

    /// Draw the channel for this run.
    pub fn from_rng(rng: &mut StdRng) -> Self {
        Self::new(rng.gen_range(0..4))
    }

    /// Noise in [0, 1] at a planar world position.
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let p = [
            x as f64 * 0.1 * JITTER_NOISE_SCALE,
            z as f64 * 0.1 * JITTER_NOISE_SCALE,
            self.channel as f64 * CHANNEL_OFFSET,
        ];
        (self.perlin.get(p) * 0.5 + 0.5).clamp(0.0, 1.0) as f32
    }
}

/// Temperature for `cell`; roughly [0, 1] before jitter.
pub fn determine_temperature(
    cell: &Cell,
    map_height: usize,
    config: &GeneratorConfig,
    jitter: &TemperatureJitter,
) -> f32 {
    let mut latitude = cell.coordinates().z as f32 / map_height as f32;
    match config.hemisphere {
        HemisphereMode::Both => {
            latitude *= 2.0;
            if latitude > 1.0 {
                latitude = 2.0 - latitude;
            }
        }
        HemisphereMode::North => latitude = 1.0 - latitude,
        HemisphereMode::South => {}
    }

    let mut temperature =
        config.low_temperature + (config.high_temperature - config.low_temperature) * latitude;

    let above_water = (cell.view_elevation() - config.water_level) as f32;
    temperature *=
        1.0 - above_water / ((config.elevation_maximum - config.water_level) as f32 + 1.0);

    let (x, z) = cell.position();
    temperature + (jitter.sample(x, z) * 2.0 - 1.0) * config.temperature_jitter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::flat_grid;
    use crate::grid::HexGrid;
    use approx::assert_relative_eq;

    fn no_jitter() -> GeneratorConfig {
        GeneratorConfig { temperature_jitter: 0.0, water_level: 1, ..GeneratorConfig::default() }
    }

    fn temp_at(grid: &HexGrid, row: usize, cfg: &GeneratorConfig) -> f32 {
        let id = grid.cell_index(0, row).unwrap();
        determine_temperature(grid.cell(id), grid.height, cfg, &TemperatureJitter::new(0))
    }

    #[test]
    fn both_hemispheres_peak_at_the_equator() {
        let grid = flat_grid(2, 10, 1);
        let cfg = no_jitter();
        assert_relative_eq!(temp_at(&grid, 0, &cfg), 0.0);
        assert_relative_eq!(temp_at(&grid, 5, &cfg), 1.0);
        assert_relative_eq!(temp_at(&grid, 8, &cfg), 0.4, epsilon = 1e-6);
    }

    #[test]
    fn north_and_south_are_mirrored() {
        let grid = flat_grid(2, 10, 1);
        let north = GeneratorConfig { hemisphere: HemisphereMode::North, ..no_jitter() };
        let south = GeneratorConfig { hemisphere: HemisphereMode::South, ..no_jitter() };
        assert_relative_eq!(temp_at(&grid, 0, &north), 1.0);
        assert_relative_eq!(temp_at(&grid, 0, &south), 0.0);
        assert_relative_eq!(temp_at(&grid, 3, &north) + temp_at(&grid, 3, &south), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn altitude_cools() {
        let mut grid = flat_grid(2, 10, 1);
        let cfg = no_jitter();
        let id = grid.cell_index(0, 5).unwrap();
        let low = temp_at(&grid, 5, &cfg);
        grid.set_elevation(id, cfg.elevation_maximum);
        let high = temp_at(&grid, 5, &cfg);
        assert!(high < low, "peak {high} should be colder than shore {low}");
        // 1 - (8 - 1) / (8 - 1 + 1)
        assert_relative_eq!(high, 0.125, epsilon = 1e-6);
    }

    #[test]
    fn jitter_samples_are_unit_range_and_channel_dependent() {
        let a = TemperatureJitter::new(0);
        let b = TemperatureJitter::new(2);
        let mut differs = false;
        for i in 0..50 {
            let (x, z) = (i as f32 * 13.7, i as f32 * 5.3);
            let (va, vb) = (a.sample(x, z), b.sample(x, z));
            assert!((0.0..=1.0).contains(&va) && (0.0..=1.0).contains(&vb));
            differs |= (va - vb).abs() > 1e-4;
        }
        assert!(differs, "channels produced identical fields");
    }
}
