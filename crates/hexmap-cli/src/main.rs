//! Command-line front end: generate one map, or a batch of seeds in parallel,
//! and print what each phase achieved.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use hexmap_core::{GenerationReport, GeneratorConfig, MapGenerator};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "hexmap", about = "Procedural hex-map generator")]
struct Args {
    /// Map width in cells (multiple of the chunk width).
    #[arg(short = 'W', long, default_value_t = 80)]
    width: usize,

    /// Map height in cells (multiple of the chunk height).
    #[arg(short = 'H', long, default_value_t = 60)]
    height: usize,

    /// Wrap the map east-west.
    #[arg(long)]
    wrap: bool,

    /// Fixed seed; overrides the config file.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Draw a fresh seed from system entropy instead.
    #[arg(long, conflicts_with = "seed")]
    random_seed: bool,

    /// Generator config JSON. Missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the map snapshot as JSON here.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the generation report as JSON here.
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Generate this many consecutive seeds in parallel and print a summary.
    #[arg(long)]
    batch: Option<usize>,

    /// Debug-level logging (RUST_LOG still wins when set).
    #[arg(short, long)]
    verbose: bool,
}

// ── Batch summary ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct BatchSummary {
    runs: usize,
    budgets_met: usize,
    mean_land_cells: f64,
    mean_rivers: f64,
    mean_roads: f64,
    mean_towns: f64,
    mean_walled_cells: f64,
}

impl BatchSummary {
    fn from_reports(reports: &[GenerationReport]) -> Self {
        let n = reports.len().max(1) as f64;
        let mean = |f: fn(&GenerationReport) -> usize| reports.iter().map(f).sum::<usize>() as f64 / n;
        Self {
            runs: reports.len(),
            budgets_met: reports.iter().filter(|r| r.budgets_met()).count(),
            mean_land_cells: mean(|r| r.final_land_cells),
            mean_rivers: mean(|r| r.rivers.rivers),
            mean_roads: mean(|r| r.roads.placed),
            mean_towns: mean(|r| r.urban.placed),
            mean_walled_cells: mean(|r| r.walled_cells),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;

    if let Some(count) = args.batch {
        if count == 0 {
            bail!("--batch needs at least one run");
        }
        return run_batch(&args, config, count);
    }

    let mut generator = MapGenerator::new(config).context("invalid generator config")?;
    let map = generator
        .generate(args.width, args.height, args.wrap)
        .with_context(|| format!("generating a {}×{} map", args.width, args.height))?;

    print_report(&map.report);

    if let Some(path) = &args.output {
        let json = map.grid.snapshot().to_json().context("serialising snapshot")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote file");
    }
    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&map.report).context("serialising report")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote file");
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
        config.use_fixed_seed = true;
    }
    if args.random_seed {
        config.use_fixed_seed = false;
    }
    Ok(config)
}

/// `count` consecutive seeds from `base`, wrapping past `u64::MAX`.
fn batch_seeds(base: u64, count: usize) -> Vec<u64> {
    (0..count as u64).map(|i| base.wrapping_add(i)).collect()
}

fn run_batch(args: &Args, config: GeneratorConfig, count: usize) -> Result<()> {
    // Each run gets its own generator and grid; only the seed differs.
    let reports = batch_seeds(config.seed, count)
        .into_par_iter()
        .map(|seed| {
            let cfg = GeneratorConfig { seed, use_fixed_seed: true, ..config.clone() };
            let mut generator = MapGenerator::new(cfg)?;
            generator.generate(args.width, args.height, args.wrap).map(|map| map.report)
        })
        .collect::<hexmap_core::Result<Vec<_>>>()
        .context("batch generation failed")?;

    for report in &reports {
        tracing::info!(
            seed = report.seed,
            land = report.final_land_cells,
            rivers = report.rivers.rivers,
            roads = report.roads.placed,
            towns = report.urban.placed,
            walled = report.walled_cells,
            budgets_met = report.budgets_met(),
            "batch run finished"
        );
    }

    let summary = BatchSummary::from_reports(&reports);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&reports).context("serialising reports")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote file");
    }
    Ok(())
}

fn print_report(report: &GenerationReport) {
    println!("seed            {}", report.seed);
    println!("size            {}×{}", report.width, report.height);
    println!("regions         {}", report.regions);
    println!(
        "land            {} / {} target ({} sweeps)",
        report.land.land_cells, report.land.target, report.land.sweeps
    );
    println!(
        "erosion         {} → {} erodible cells, {} moves",
        report.erosion.initial_erodible, report.erosion.remaining_erodible, report.erosion.moves
    );
    println!(
        "rivers          {} ({} of {} budget left)",
        report.rivers.rivers, report.rivers.budget_remaining, report.rivers.budget
    );
    println!(
        "roads           {} ({} of {} budget left)",
        report.roads.placed, report.roads.budget_remaining, report.roads.budget
    );
    println!(
        "towns           {} ({} of {} budget left)",
        report.urban.placed, report.urban.budget_remaining, report.urban.budget
    );
    println!(
        "farms           {} ({} of {} budget left)",
        report.farms.placed, report.farms.budget_remaining, report.farms.budget
    );
    println!("walled cells    {}", report.walled_cells);
    println!("final land      {}", report.final_land_cells);
}
