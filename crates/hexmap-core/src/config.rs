//! Generator parameters: defaults, serde loading and range validation.

use serde::{Deserialize, Serialize};

use crate::coords::HexDirection;
use crate::error::{MapError, Result};

/// Which hemisphere(s) the map's latitude range covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HemisphereMode {
    /// Equator across the middle, poles at both the top and bottom rows.
    Both,
    /// Equator at the bottom row, pole at the top.
    North,
    /// Pole at the bottom row, equator at the top.
    South,
}

/// Full parameter set for one generation run.
/// Every field has a documented range, checked by [`GeneratorConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    /// When false, a fresh seed is drawn from system entropy for every run.
    pub use_fixed_seed: bool,

    /// Grid chunk size in cells; map width/height must be multiples of it.
    pub chunk_columns: usize,
    pub chunk_rows: usize,

    // Elevation sculpting.
    /// 0-0.5. Chance a flood-fill step gets +1 priority.
    pub jitter_probability: f32,
    /// 20-200. Cells raised or sunk per sculpting pass.
    pub chunk_size_min: usize,
    pub chunk_size_max: usize,
    /// 5-95. Share of cells that end up above water.
    pub land_percentage: u32,
    /// 1-5.
    pub water_level: i32,
    /// 0-1. Chance a pass moves elevation by 2 instead of 1.
    pub high_rise_probability: f32,
    /// 0-0.4. Chance a sweep sinks instead of raises.
    pub sink_probability: f32,
    /// −4-0.
    pub elevation_minimum: i32,
    /// 6-10.
    pub elevation_maximum: i32,
    /// 0-10. Cells kept free of sculpting seeds at the map edge.
    pub map_border_x: usize,
    pub map_border_z: usize,
    /// 0-10. Gap between neighbouring regions.
    pub region_border: usize,
    /// 1-4.
    pub region_count: usize,

    /// 0-100. Share of erodible cells smoothed away.
    pub erosion_percentage: u32,

    // Climate, all 0-1.
    pub starting_moisture: f32,
    pub evaporation_factor: f32,
    pub precipitation_factor: f32,
    pub runoff_factor: f32,
    pub seepage_factor: f32,
    pub wind_from: HexDirection,
    /// 1-10.
    pub wind_strength: f32,

    /// 0-20. River length budget as a share of land cells.
    pub river_percentage: u32,
    /// 0-1.
    pub extra_lake_probability: f32,

    // Temperature, all 0-1.
    pub low_temperature: f32,
    pub high_temperature: f32,
    pub temperature_jitter: f32,
    pub hemisphere: HemisphereMode,

    /// 0-20. Road length budget as a share of land cells.
    pub road_percentage: u32,
    /// 1-50.
    pub min_road_length: usize,
    pub max_road_length: usize,

    /// 0-20.
    pub urban_percentage: u32,
    /// 1-20.
    pub min_urban_stamp: usize,
    pub max_urban_stamp: usize,

    /// 0-20.
    pub farm_percentage: u32,
    /// 1-20.
    pub min_farm_stamp: usize,
    pub max_farm_stamp: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            use_fixed_seed: true,
            chunk_columns: 5,
            chunk_rows: 5,
            jitter_probability: 0.25,
            chunk_size_min: 30,
            chunk_size_max: 100,
            land_percentage: 50,
            water_level: 3,
            high_rise_probability: 0.25,
            sink_probability: 0.2,
            elevation_minimum: -2,
            elevation_maximum: 8,
            map_border_x: 5,
            map_border_z: 5,
            region_border: 5,
            region_count: 1,
            erosion_percentage: 50,
            starting_moisture: 0.1,
            evaporation_factor: 0.5,
            precipitation_factor: 0.25,
            runoff_factor: 0.25,
            seepage_factor: 0.125,
            wind_from: HexDirection::NW,
            wind_strength: 4.0,
            river_percentage: 10,
            extra_lake_probability: 0.25,
            low_temperature: 0.0,
            high_temperature: 1.0,
            temperature_jitter: 0.1,
            hemisphere: HemisphereMode::Both,
            road_percentage: 10,
            min_road_length: 6,
            max_road_length: 20,
            urban_percentage: 5,
            min_urban_stamp: 4,
            max_urban_stamp: 8,
            farm_percentage: 10,
            min_farm_stamp: 2,
            max_farm_stamp: 4,
        }
    }
}

impl GeneratorConfig {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<()> {
        check_f32("jitter_probability", self.jitter_probability, 0.0, 0.5, "[0, 0.5]")?;
        check_ordered(
            "chunk_size",
            self.chunk_size_min,
            self.chunk_size_max,
            20,
            200,
            "[20, 200] with min ≤ max",
        )?;
        check_int("land_percentage", self.land_percentage as i64, 5, 95, "[5, 95]")?;
        check_int("water_level", self.water_level as i64, 1, 5, "[1, 5]")?;
        check_f32("high_rise_probability", self.high_rise_probability, 0.0, 1.0, "[0, 1]")?;
        check_f32("sink_probability", self.sink_probability, 0.0, 0.4, "[0, 0.4]")?;
        check_int("elevation_minimum", self.elevation_minimum as i64, -4, 0, "[-4, 0]")?;
        check_int("elevation_maximum", self.elevation_maximum as i64, 6, 10, "[6, 10]")?;
        check_int("map_border_x", self.map_border_x as i64, 0, 10, "[0, 10]")?;
        check_int("map_border_z", self.map_border_z as i64, 0, 10, "[0, 10]")?;
        check_int("region_border", self.region_border as i64, 0, 10, "[0, 10]")?;
        check_int("region_count", self.region_count as i64, 1, 4, "[1, 4]")?;
        check_int("erosion_percentage", self.erosion_percentage as i64, 0, 100, "[0, 100]")?;
        check_f32("starting_moisture", self.starting_moisture, 0.0, 1.0, "[0, 1]")?;
        check_f32("evaporation_factor", self.evaporation_factor, 0.0, 1.0, "[0, 1]")?;
        check_f32("precipitation_factor", self.precipitation_factor, 0.0, 1.0, "[0, 1]")?;
        check_f32("runoff_factor", self.runoff_factor, 0.0, 1.0, "[0, 1]")?;
        check_f32("seepage_factor", self.seepage_factor, 0.0, 1.0, "[0, 1]")?;
        check_f32("wind_strength", self.wind_strength, 1.0, 10.0, "[1, 10]")?;
        check_int("river_percentage", self.river_percentage as i64, 0, 20, "[0, 20]")?;
        check_f32("extra_lake_probability", self.extra_lake_probability, 0.0, 1.0, "[0, 1]")?;
        check_f32("low_temperature", self.low_temperature, 0.0, 1.0, "[0, 1]")?;
        check_f32("high_temperature", self.high_temperature, 0.0, 1.0, "[0, 1]")?;
        check_f32("temperature_jitter", self.temperature_jitter, 0.0, 1.0, "[0, 1]")?;
        check_int("road_percentage", self.road_percentage as i64, 0, 20, "[0, 20]")?;
        check_ordered(
            "road_length",
            self.min_road_length,
            self.max_road_length,
            1,
            50,
            "[1, 50] with min ≤ max",
        )?;
        check_int("urban_percentage", self.urban_percentage as i64, 0, 20, "[0, 20]")?;
        check_ordered(
            "urban_stamp",
            self.min_urban_stamp,
            self.max_urban_stamp,
            1,
            20,
            "[1, 20] with min ≤ max",
        )?;
        check_int("farm_percentage", self.farm_percentage as i64, 0, 20, "[0, 20]")?;
        check_ordered(
            "farm_stamp",
            self.min_farm_stamp,
            self.max_farm_stamp,
            1,
            20,
            "[1, 20] with min ≤ max",
        )?;
        if self.chunk_columns == 0 || self.chunk_rows == 0 {
            return Err(MapError::InvalidConfig {
                field: "chunk_columns/chunk_rows",
                value: format!("{}×{}", self.chunk_columns, self.chunk_rows),
                expected: "≥ 1",
            });
        }
        Ok(())
    }

    /// Elevation at and above which sandy land turns to stone.
    pub fn rock_desert_elevation(&self) -> i32 {
        self.elevation_maximum - (self.elevation_maximum - self.water_level) / 2
    }
}

/// `percentage` percent of `count`, rounded to the nearest whole cell.
pub fn percentage_of(count: usize, percentage: u32) -> usize {
    (count as f64 * percentage as f64 * 0.01).round() as usize
}

fn check_f32(field: &'static str, v: f32, lo: f32, hi: f32, expected: &'static str) -> Result<()> {
    if v.is_finite() && (lo..=hi).contains(&v) {
        Ok(())
    } else {
        Err(MapError::InvalidConfig { field, value: v.to_string(), expected })
    }
}

fn check_int(field: &'static str, v: i64, lo: i64, hi: i64, expected: &'static str) -> Result<()> {
    if (lo..=hi).contains(&v) {
        Ok(())
    } else {
        Err(MapError::InvalidConfig { field, value: v.to_string(), expected })
    }
}

fn check_ordered(
    field: &'static str,
    min: usize,
    max: usize,
    lo: usize,
    hi: usize,
    expected: &'static str,
) -> Result<()> {
    if min <= max && min >= lo && max <= hi {
        Ok(())
    } else {
        Err(MapError::InvalidConfig { field, value: format!("{min}..={max}"), expected })
    }
}
