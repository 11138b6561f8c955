//! Urban and farm stamping.
//!
//! Both features grow the same way: start on a weighted origin, then walk to
//! neighbouring land, bumping the feature level of each cell left behind.
//! They differ only in how origins and steps are weighted.

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{percentage_of, GeneratorConfig};
use crate::coords::HexDirection;
use crate::grid::{Cell, CellId, HexGrid, TerrainType, MAX_FEATURE_LEVEL};
use crate::weighted::{pick_direction, WeightedPool};

use super::BudgetOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Urban,
    Farm,
}

impl FeatureKind {
    pub fn level(self, cell: &Cell) -> u8 {
        match self {
            FeatureKind::Urban => cell.urban_level(),
            FeatureKind::Farm => cell.farm_level(),
        }
    }

    fn set_level(self, grid: &mut HexGrid, id: CellId, level: u8) {
        match self {
            FeatureKind::Urban => grid.set_urban_level(id, level),
            FeatureKind::Farm => grid.set_farm_level(id, level),
        }
    }

    fn percentage(self, config: &GeneratorConfig) -> u32 {
        match self {
            FeatureKind::Urban => config.urban_percentage,
            FeatureKind::Farm => config.farm_percentage,
        }
    }

    fn stamp_range(self, config: &GeneratorConfig) -> (usize, usize) {
        match self {
            FeatureKind::Urban => (config.min_urban_stamp, config.max_urban_stamp),
            FeatureKind::Farm => (config.min_farm_stamp, config.max_farm_stamp),
        }
    }

    fn origin_weight(self, grid: &HexGrid, id: CellId) -> u32 {
        let cell = grid.cell(id);
        let roads = cell.road_count();
        match self {
            FeatureKind::Urban => {
                u32::from(roads > 1) + u32::from(roads > 3) + 2 * u32::from(roads > 5)
            }
            FeatureKind::Farm => {
                let served = cell
                    .neighbor_ids()
                    .into_iter()
                    .flatten()
                    .filter(|&n| grid.cell(n).has_roads())
                    .count() as u32;
                2 * u32::from(roads > 1 && cell.urban_level() <= 1) + served
            }
        }
    }

    fn step_weight(self, neighbor: &Cell) -> u32 {
        match self {
            FeatureKind::Urban => {
                if neighbor.has_roads() {
                    3
                } else {
                    1
                }
            }
            FeatureKind::Farm => {
                1 + u32::from(neighbor.farm_level() == 0) + u32::from(neighbor.has_roads())
            }
        }
    }

    fn name(self) -> &'static str {
        match self {
            FeatureKind::Urban => "urban",
            FeatureKind::Farm => "farm",
        }
    }
}

fn is_settleable(cell: &Cell) -> bool {
    !cell.is_underwater() && cell.terrain() != TerrainType::Snow
}

/// Stamp `kind` across the map until its share of land cells is covered.
pub fn create_features(
    grid: &mut HexGrid,
    rng: &mut StdRng,
    config: &GeneratorConfig,
    kind: FeatureKind,
    land_cells: usize,
) -> BudgetOutcome {
    let mut origins = WeightedPool::from_weights(
        (0..grid.len())
            .filter(|&id| is_settleable(grid.cell(id)))
            .map(|id| (id, kind.origin_weight(grid, id))),
    );

    let budget = percentage_of(land_cells, kind.percentage(config));
    let (stamp_min, stamp_max) = kind.stamp_range(config);
    let mut remaining = budget;
    let mut placed = 0;
    while remaining > 0 {
        let Some(origin) = origins.take(rng) else {
            break;
        };
        if kind.level(grid.cell(origin)) >= MAX_FEATURE_LEVEL {
            continue;
        }
        let stamp = rng.gen_range(stamp_min..=stamp_max);
        let size = grow_feature(grid, rng, kind, origin, stamp);
        if size > 0 {
            placed += 1;
        }
        remaining = remaining.saturating_sub(size);
    }

    if remaining > 0 {
        tracing::warn!(feature = kind.name(), budget_remaining = remaining, budget, "failed to use up feature budget");
    }
    BudgetOutcome { budget, budget_remaining: remaining, placed }
}

/// Walk from `origin`, raising the feature level of each cell it leaves.
/// Returns the number of newly settled cells plus one, or 0 when the walk
/// could not start.
pub fn grow_feature(
    grid: &mut HexGrid,
    rng: &mut StdRng,
    kind: FeatureKind,
    origin: CellId,
    stamp: usize,
) -> usize {
    let max_steps = grid.len();
    let mut steps = 0;
    let mut size = 1;
    let mut cell = origin;

    while !grid.cell(cell).is_underwater() && size <= stamp && steps <= max_steps {
        steps += 1;
        let mut weights = [0u32; 6];
        let elevation = grid.cell(cell).elevation();
        for d in HexDirection::ALL {
            let Some(n) = grid.neighbor(cell, d) else {
                continue;
            };
            let neighbor = grid.cell(n);
            if !is_settleable(neighbor)
                || kind.level(neighbor) >= MAX_FEATURE_LEVEL
                || neighbor.elevation() - elevation > 1
            {
                continue;
            }
            weights[d.index()] = kind.step_weight(neighbor);
        }

        let Some(direction) = pick_direction(rng, &weights) else {
            if size == 1 {
                return 0;
            }
            break;
        };

        let level = kind.level(grid.cell(cell));
        if level == 0 {
            size += 1;
        }
        kind.set_level(grid, cell, level + 1);

        match grid.neighbor(cell, direction) {
            Some(n) => cell = n,
            None => break,
        }
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::flat_grid;
    use rand::SeedableRng;

    fn road_cross(grid: &mut HexGrid, centre: CellId) {
        for d in HexDirection::ALL {
            assert!(grid.add_road(centre, d));
        }
    }

    #[test]
    fn urban_grows_around_a_crossroads() {
        let mut grid = flat_grid(10, 10, 3);
        let centre = grid.cell_index(5, 5).unwrap();
        road_cross(&mut grid, centre);
        let cfg = GeneratorConfig { urban_percentage: 5, ..GeneratorConfig::default() };
        let mut rng = StdRng::seed_from_u64(2);

        let outcome = create_features(&mut grid, &mut rng, &cfg, FeatureKind::Urban, 100);
        assert_eq!(outcome.budget, 5);
        assert!(outcome.placed >= 1);
        // The crossroads is the only weighted origin.
        assert!(grid.cell(centre).urban_level() > 0);
        assert!(grid.cells().iter().all(|c| c.urban_level() <= MAX_FEATURE_LEVEL));
    }

    #[test]
    fn no_roads_means_no_urban() {
        let mut grid = flat_grid(6, 6, 3);
        let cfg = GeneratorConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = create_features(&mut grid, &mut rng, &cfg, FeatureKind::Urban, 36);
        assert_eq!(outcome.placed, 0);
        assert_eq!(outcome.budget_remaining, outcome.budget);
        assert!(grid.cells().iter().all(|c| c.urban_level() == 0));
    }

    #[test]
    fn farms_settle_next_to_roads() {
        let mut grid = flat_grid(10, 10, 3);
        let centre = grid.cell_index(4, 4).unwrap();
        road_cross(&mut grid, centre);
        let cfg = GeneratorConfig { farm_percentage: 10, ..GeneratorConfig::default() };
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = create_features(&mut grid, &mut rng, &cfg, FeatureKind::Farm, 100);
        assert!(outcome.placed >= 1);
        let farms: Vec<CellId> = (0..grid.len()).filter(|&id| grid.cell(id).farm_level() > 0).collect();
        assert!(!farms.is_empty());
        // Every farm walk starts on or next to the road cluster.
        assert!(farms.iter().any(|&id| grid.distance(id, centre) <= 2));
    }

    #[test]
    fn walk_skips_snow_water_and_cliffs() {
        let mut grid = flat_grid(5, 5, 3);
        let origin = grid.cell_index(2, 2).unwrap();
        let ids = grid.cell(origin).neighbor_ids();
        let ns: Vec<CellId> = ids.iter().flatten().copied().collect();
        grid.set_elevation(ns[0], 0);
        grid.set_terrain(ns[1], TerrainType::Snow);
        grid.set_elevation(ns[2], 6);
        for &n in &ns[3..] {
            grid.set_urban_level(n, MAX_FEATURE_LEVEL);
        }
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(grow_feature(&mut grid, &mut rng, FeatureKind::Urban, origin, 5), 0);

        // Open one neighbour: the walk settles the origin and moves on.
        grid.set_urban_level(ns[3], 0);
        let size = grow_feature(&mut grid, &mut rng, FeatureKind::Urban, origin, 1);
        assert_eq!(size, 2);
        assert_eq!(grid.cell(origin).urban_level(), 1);
    }
}
