//! Pipeline orchestrator: runs all generation phases in order on one grid.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::climate::{classify_terrain, simulate_climate};
use crate::config::GeneratorConfig;
use crate::error::{MapError, Result};
use crate::grid::HexGrid;
use crate::hydrology::{create_rivers, RiverOutcome};
use crate::queue::CellPriorityQueue;
use crate::settlement::{create_features, create_roads, create_walls, BudgetOutcome, FeatureKind};
use crate::terrain::{create_land, create_regions, erode_land, ErosionOutcome, LandOutcome};

// ── Public structs ────────────────────────────────────────────────────────────

/// What each phase achieved. Shortfalls are recorded here, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    pub regions: usize,
    pub land: LandOutcome,
    pub erosion: ErosionOutcome,
    pub rivers: RiverOutcome,
    pub roads: BudgetOutcome,
    pub urban: BudgetOutcome,
    pub farms: BudgetOutcome,
    pub walled_cells: usize,
    /// Land cells after erosion and lake carving.
    pub final_land_cells: usize,
}

impl GenerationReport {
    /// True when every budgeted phase spent its whole budget.
    pub fn budgets_met(&self) -> bool {
        self.land.budget_remaining == 0
            && self.rivers.budget_remaining == 0
            && self.roads.budget_remaining == 0
            && self.urban.budget_remaining == 0
            && self.farms.budget_remaining == 0
    }
}

pub struct GeneratedMap {
    pub grid: HexGrid,
    pub report: GenerationReport,
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Owns the validated config and the scratch queue shared by all searches.
pub struct MapGenerator {
    config: GeneratorConfig,
    queue: CellPriorityQueue,
    cancel: Arc<AtomicBool>,
}

impl MapGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, queue: CellPriorityQueue::new(), cancel: Arc::new(AtomicBool::new(false)) })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Shared flag; setting it stops the current run at the next phase
    /// boundary with [`MapError::Cancelled`].
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Seed for the next run: the configured one, or fresh entropy.
    pub fn resolve_seed(&self) -> u64 {
        if self.config.use_fixed_seed {
            self.config.seed
        } else {
            u64::from(rand::random::<u32>() & 0x7fff_ffff)
        }
    }

    /// Build a new grid and generate a map on it.
    pub fn generate(&mut self, width: usize, height: usize, wrap: bool) -> Result<GeneratedMap> {
        let mut grid = HexGrid::with_chunks(
            width,
            height,
            wrap,
            self.config.chunk_columns,
            self.config.chunk_rows,
        )?;
        let report = self.generate_into(&mut grid)?;
        Ok(GeneratedMap { grid, report })
    }

    /// Regenerate an existing grid in place, keeping its size and wrapping.
    pub fn generate_into(&mut self, grid: &mut HexGrid) -> Result<GenerationReport> {
        let seed = self.resolve_seed();
        let span = tracing::info_span!("generate", seed, width = grid.width, height = grid.height);
        let _enter = span.enter();

        let mut rng = StdRng::seed_from_u64(seed);
        let cfg = &self.config;

        grid.reset();
        self.queue.clear();
        for id in 0..grid.len() {
            grid.set_water_level(id, cfg.water_level);
        }

        // ── 1. Landmass ──────────────────────────────────────────────────────
        self.check_cancelled("regions")?;
        let regions = create_regions(&mut rng, cfg, grid.width, grid.height, grid.wrap);
        let land = create_land(grid, &mut self.queue, &mut rng, cfg, &regions);
        tracing::debug!(land_cells = land.land_cells, sweeps = land.sweeps, "land sculpted");

        self.check_cancelled("erosion")?;
        let erosion = erode_land(grid, &mut rng, cfg.erosion_percentage);

        // ── 2. Climate and water ─────────────────────────────────────────────
        self.check_cancelled("climate")?;
        let climate = simulate_climate(grid, cfg);

        self.check_cancelled("rivers")?;
        let rivers = create_rivers(grid, &mut rng, cfg, &climate, land.land_cells);
        tracing::debug!(rivers = rivers.rivers, "rivers placed");

        // ── 3. Roads and biomes ──────────────────────────────────────────────
        self.check_cancelled("roads")?;
        let roads = create_roads(grid, &mut rng, cfg, land.land_cells);

        self.check_cancelled("terrain")?;
        classify_terrain(grid, &mut rng, cfg, &climate);

        // ── 4. Settlements ───────────────────────────────────────────────────
        self.check_cancelled("urban")?;
        let urban = create_features(grid, &mut rng, cfg, FeatureKind::Urban, land.land_cells);
        self.check_cancelled("farms")?;
        let farms = create_features(grid, &mut rng, cfg, FeatureKind::Farm, land.land_cells);
        self.check_cancelled("walls")?;
        let walled_cells = create_walls(grid, &mut rng);

        grid.reset_search_phases();

        let final_land_cells = grid.cells().iter().filter(|c| !c.is_underwater()).count();
        let report = GenerationReport {
            seed,
            width: grid.width,
            height: grid.height,
            regions: regions.len(),
            land,
            erosion,
            rivers,
            roads,
            urban,
            farms,
            walled_cells,
            final_land_cells,
        };
        if report.budgets_met() {
            tracing::info!(final_land_cells, walled_cells, "map generated");
        } else {
            tracing::info!(final_land_cells, walled_cells, "map generated with unspent budgets");
        }
        Ok(report)
    }

    fn check_cancelled(&self, phase: &'static str) -> Result<()> {
        if self.cancel.load(Ordering::Relaxed) {
            tracing::warn!(phase, "generation cancelled");
            return Err(MapError::Cancelled { phase });
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::HexDirection;
    use crate::grid::{TerrainType, MAX_FEATURE_LEVEL};
    use crate::hydrology::tests::assert_river_law;
    use crate::settlement::roads::tests::assert_roads_valid;

    fn generator(seed: u64) -> MapGenerator {
        MapGenerator::new(GeneratorConfig { seed, ..GeneratorConfig::default() }).unwrap()
    }

    #[test]
    fn same_seed_same_map() {
        let a = generator(1234).generate(40, 30, false).unwrap();
        let b = generator(1234).generate(40, 30, false).unwrap();
        assert_eq!(a.grid.snapshot(), b.grid.snapshot());
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn different_seeds_differ() {
        let a = generator(1).generate(40, 30, false).unwrap();
        let b = generator(2).generate(40, 30, false).unwrap();
        assert_ne!(a.grid.snapshot(), b.grid.snapshot());
    }

    #[test]
    fn whole_map_invariants_hold() {
        for (seed, wrap) in [(7, false), (8, true), (9, false)] {
            let cfg = GeneratorConfig { seed, region_count: (seed % 4 + 1) as usize, ..GeneratorConfig::default() };
            let mut gen = MapGenerator::new(cfg.clone()).unwrap();
            let map = gen.generate(50, 40, wrap).unwrap();
            let grid = &map.grid;

            assert_river_law(grid);
            assert_roads_valid(grid);
            for (id, cell) in grid.cells().iter().enumerate() {
                assert!(
                    (cfg.elevation_minimum..=cfg.elevation_maximum).contains(&cell.elevation()),
                    "seed {seed}: cell {id} elevation {}",
                    cell.elevation()
                );
                assert_eq!(cell.search.phase, 0, "seed {seed}: search phase left behind");
                assert!(cell.urban_level() <= MAX_FEATURE_LEVEL);
                assert!(cell.farm_level() <= MAX_FEATURE_LEVEL);
                assert!(cell.plant_level() <= MAX_FEATURE_LEVEL);
                if cell.is_underwater() {
                    assert!(!cell.has_roads(), "seed {seed}: road under water at {id}");
                    assert_eq!(cell.urban_level(), 0, "seed {seed}: town under water at {id}");
                } else if cell.terrain() == TerrainType::Snow {
                    assert_eq!(cell.plant_level(), 0);
                }
                for d in HexDirection::ALL {
                    if let Some(n) = cell.neighbor(d) {
                        assert_eq!(grid.neighbor(n, d.opposite()), Some(id));
                    }
                }
            }
            assert_eq!(map.report.regions, cfg.region_count);
            assert_eq!(map.report.land.target, (50.0 * 40.0 * 0.5f64).round() as usize);
        }
    }

    #[test]
    fn wrapped_maps_generate() {
        let map = generator(11).generate(30, 20, true).unwrap();
        assert!(map.grid.wrap);
        assert_river_law(&map.grid);
        assert_roads_valid(&map.grid);
        let seam = map.grid.cell_index(29, 1).unwrap();
        assert_eq!(map.grid.neighbor(seam, HexDirection::E), map.grid.cell_index(0, 1));
    }

    #[test]
    fn generate_into_matches_generate() {
        let mut gen = generator(77);
        let fresh = gen.generate(40, 30, false).unwrap();
        let mut reused = HexGrid::with_chunks(40, 30, false, 5, 5).unwrap();
        // Dirty the grid first; regeneration must not depend on leftovers.
        gen.generate_into(&mut reused).unwrap();
        let report = gen.generate_into(&mut reused).unwrap();
        assert_eq!(reused.snapshot(), fresh.grid.snapshot());
        assert_eq!(report, fresh.report);
    }

    #[test]
    fn bad_size_is_rejected_before_work() {
        let err = generator(0).generate(42, 30, false).err();
        assert!(matches!(err, Some(MapError::InvalidDimensions { width: 42, .. })));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = GeneratorConfig { region_count: 9, ..GeneratorConfig::default() };
        assert!(matches!(MapGenerator::new(cfg), Err(MapError::InvalidConfig { field: "region_count", .. })));
    }

    #[test]
    fn cancelled_run_stops_at_a_phase_boundary() {
        let mut gen = generator(5);
        gen.cancel_handle().store(true, Ordering::Relaxed);
        match gen.generate(40, 30, false) {
            Err(MapError::Cancelled { phase }) => assert_eq!(phase, "regions"),
            Err(other) => panic!("expected cancellation, got {other:?}"),
            Ok(_) => panic!("expected cancellation, got a map"),
        }
    }

    #[test]
    fn entropy_seed_is_reported() {
        let cfg = GeneratorConfig { use_fixed_seed: false, ..GeneratorConfig::default() };
        let mut gen = MapGenerator::new(cfg).unwrap();
        let map = gen.generate(40, 30, false).unwrap();
        assert!(map.report.seed <= 0x7fff_ffff);

        // Replaying the reported seed reproduces the map.
        let mut replay = generator(map.report.seed);
        let again = replay.generate(40, 30, false).unwrap();
        assert_eq!(again.grid.snapshot(), map.grid.snapshot());
    }

    #[test]
    fn most_land_budget_is_met_on_default_settings() {
        let map = generator(42).generate(80, 60, false).unwrap();
        assert_eq!(map.report.land.budget_remaining, 0);
        assert_eq!(map.report.land.land_cells, 2400);
        assert!(map.report.final_land_cells > 0);
        assert!(map.report.rivers.rivers > 0, "no rivers on an 80×60 map");
        assert!(map.grid.cells().iter().any(|c| c.has_roads()));
    }
}
