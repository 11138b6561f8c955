//! Rectangular seed regions for landmass sculpting.
//!
//! Regions only bias where sculpting passes start; the flood fills themselves
//! are free to spill across region borders.

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::GeneratorConfig;
use crate::grid::{CellId, HexGrid};

/// Offset-coordinate bounding box; maxima are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRegion {
    pub x_min: usize,
    pub x_max: usize,
    pub z_min: usize,
    pub z_max: usize,
}

impl MapRegion {
    /// Uniformly random cell inside the region.
    pub fn random_cell(&self, grid: &HexGrid, rng: &mut StdRng) -> CellId {
        let col = rng.gen_range(self.x_min..self.x_max);
        let row = rng.gen_range(self.z_min..self.z_max);
        row * grid.width + col
    }
}

/// Region bounds before they are checked against the map size.
#[derive(Debug, Clone, Copy)]
struct RawRegion {
    x_min: i64,
    x_max: i64,
    z_min: i64,
    z_max: i64,
}

impl RawRegion {
    fn new(x_min: i64, x_max: i64, z_min: i64, z_max: i64) -> Self {
        Self { x_min, x_max, z_min, z_max }
    }

    fn is_usable(&self, width: usize, height: usize) -> bool {
        self.x_min >= 0
            && self.z_min >= 0
            && self.x_min < self.x_max
            && self.z_min < self.z_max
            && self.x_max <= width as i64
            && self.z_max <= height as i64
    }

    /// Squeeze into the map, keeping at least one cell on each axis.
    fn clamped(&self, width: usize, height: usize) -> MapRegion {
        let (x_min, x_max) = clamp_axis(self.x_min, self.x_max, width);
        let (z_min, z_max) = clamp_axis(self.z_min, self.z_max, height);
        MapRegion { x_min, x_max, z_min, z_max }
    }
}

fn clamp_axis(lo: i64, hi: i64, extent: usize) -> (usize, usize) {
    let extent = extent as i64;
    let lo = lo.clamp(0, extent - 1);
    let hi = hi.clamp(lo + 1, extent);
    (lo as usize, hi as usize)
}

/// Split the map into `config.region_count` seed regions.
///
/// When the configured borders leave no room on a small map the split is
/// retried without borders, and as a last resort each region is squeezed to
/// at least one cell per axis.
pub fn create_regions(
    rng: &mut StdRng,
    config: &GeneratorConfig,
    width: usize,
    height: usize,
    wrap: bool,
) -> Vec<MapRegion> {
    let vertical = config.region_count == 2 && rng.gen::<f32>() < 0.5;
    let raw = split(
        vertical,
        config.region_count,
        width as i64,
        height as i64,
        wrap,
        config.map_border_x as i64,
        config.map_border_z as i64,
        config.region_border as i64,
    );
    if raw.iter().all(|r| r.is_usable(width, height)) {
        return raw.iter().map(|r| r.clamped(width, height)).collect();
    }

    tracing::warn!(
        width,
        height,
        region_count = config.region_count,
        "region borders leave no room; splitting without borders"
    );
    let bare = split(vertical, config.region_count, width as i64, height as i64, wrap, 0, 0, 0);
    bare.iter().map(|r| r.clamped(width, height)).collect()
}

#[allow(clippy::too_many_arguments)]
fn split(
    vertical: bool,
    count: usize,
    w: i64,
    h: i64,
    wrap: bool,
    map_border_x: i64,
    map_border_z: i64,
    region_border: i64,
) -> Vec<RawRegion> {
    // No map border at the wrap seam; regions still keep their own gap.
    let border_x = if wrap { region_border } else { map_border_x };
    let full_border_x = if wrap { 0 } else { map_border_x };
    let bz = map_border_z;
    let rb = region_border;

    match count {
        2 if vertical => vec![
            RawRegion::new(border_x, w / 2 - rb, bz, h - bz),
            RawRegion::new(w / 2 + rb, w - border_x, bz, h - bz),
        ],
        2 => vec![
            RawRegion::new(full_border_x, w - full_border_x, bz, h / 2 - rb),
            RawRegion::new(full_border_x, w - full_border_x, h / 2 + rb, h - bz),
        ],
        3 => vec![
            RawRegion::new(border_x, w / 3 - rb, bz, h - bz),
            RawRegion::new(w / 3 + rb, w * 2 / 3 - rb, bz, h - bz),
            RawRegion::new(w * 2 / 3 + rb, w - border_x, bz, h - bz),
        ],
        4 => vec![
            RawRegion::new(border_x, w / 2 - rb, bz, h / 2 - rb),
            RawRegion::new(w / 2 + rb, w - border_x, bz, h / 2 - rb),
            RawRegion::new(w / 2 + rb, w - border_x, h / 2 + rb, h - bz),
            RawRegion::new(border_x, w / 2 - rb, h / 2 + rb, h - bz),
        ],
        _ => vec![RawRegion::new(full_border_x, w - full_border_x, bz, h - bz)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn overlaps(a: &MapRegion, b: &MapRegion) -> bool {
        a.x_min < b.x_max && b.x_min < a.x_max && a.z_min < b.z_max && b.z_min < a.z_max
    }

    #[test]
    fn region_counts_and_no_overlap() {
        for count in 1..=4 {
            for seed in 0..8 {
                let mut rng = StdRng::seed_from_u64(seed);
                let cfg = GeneratorConfig { region_count: count, ..GeneratorConfig::default() };
                let regions = create_regions(&mut rng, &cfg, 80, 60, false);
                assert_eq!(regions.len(), count);
                for (i, a) in regions.iter().enumerate() {
                    assert!(a.x_min < a.x_max && a.z_min < a.z_max);
                    assert!(a.x_max <= 80 && a.z_max <= 60);
                    for b in &regions[i + 1..] {
                        assert!(!overlaps(a, b), "count={count}: {a:?} overlaps {b:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn single_region_respects_map_border() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = GeneratorConfig::default();
        let regions = create_regions(&mut rng, &cfg, 40, 30, false);
        assert_eq!(regions[0], MapRegion { x_min: 5, x_max: 35, z_min: 5, z_max: 25 });
    }

    #[test]
    fn wrapping_drops_x_border_on_single_region() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = GeneratorConfig::default();
        let regions = create_regions(&mut rng, &cfg, 40, 30, true);
        assert_eq!(regions[0].x_min, 0);
        assert_eq!(regions[0].x_max, 40);
    }

    #[test]
    fn tiny_map_falls_back_to_usable_regions() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = GeneratorConfig { region_count: 4, ..GeneratorConfig::default() };
        let regions = create_regions(&mut rng, &cfg, 6, 6, false);
        let grid = HexGrid::new(6, 6, false).unwrap();
        for r in &regions {
            assert!(r.x_min < r.x_max && r.z_min < r.z_max);
            let id = r.random_cell(&grid, &mut rng);
            let cell = grid.cell(id);
            assert!((r.x_min..r.x_max).contains(&cell.col()) && (r.z_min..r.z_max).contains(&cell.row()));
        }
    }
}
