//! Diagnostic visualizer: writes three PNG debug images of a hex map.
//! Not part of the main pipeline; no tests.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hexmap_core::snapshot::unpack_river;
use hexmap_core::{CellRecord, GeneratorConfig, HexDirection, MapGenerator, MapSnapshot};
use image::{Rgb, RgbImage};

/// Pixels per cell.
const CELL: u32 = 8;

#[derive(Parser, Debug)]
#[command(name = "visualize", about = "Render a hex map to PNG debug images")]
struct Args {
    /// Snapshot JSON written by `hexmap --output`. Generates a map when absent.
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    #[arg(short = 'W', long, default_value_t = 80)]
    width: usize,

    #[arg(short = 'H', long, default_value_t = 60)]
    height: usize,

    /// Output directory.
    #[arg(short, long, default_value = "data/debug")]
    output: PathBuf,
}

// ── Colour helpers ────────────────────────────────────────────────────────────

/// Terrain index → RGB, in `TerrainType` order.
fn terrain_color(terrain: u8) -> [u8; 3] {
    match terrain {
        0 => [222, 200, 140], // sand
        1 => [110, 170, 70],  // grass
        2 => [120, 95, 60],   // mud
        3 => [140, 140, 140], // stone
        _ => [245, 245, 250], // snow
    }
}

/// Deeper water is darker.
fn water_color(depth: i32) -> [u8; 3] {
    let t = (depth.clamp(1, 6) - 1) as f32 / 5.0;
    [(70.0 - 50.0 * t) as u8, (130.0 - 80.0 * t) as u8, (220.0 - 80.0 * t) as u8]
}

/// Elevation −4..10 → grayscale.
fn gray(elevation: i8) -> [u8; 3] {
    let c = ((i32::from(elevation) + 4) as f32 / 14.0 * 255.0).clamp(0.0, 255.0) as u8;
    [c, c, c]
}

// ── Drawing ───────────────────────────────────────────────────────────────────

/// Top-left pixel of a cell. Odd rows shift right by half a cell; row 0 is
/// the southern edge, drawn at the bottom.
fn cell_origin(snap: &MapSnapshot, col: usize, row: usize) -> (u32, u32) {
    let x = col as u32 * CELL + (row as u32 % 2) * CELL / 2;
    let y = (snap.height - 1 - row) as u32 * CELL;
    (x, y)
}

fn cell_center(snap: &MapSnapshot, col: usize, row: usize) -> (i32, i32) {
    let (x, y) = cell_origin(snap, col, row);
    ((x + CELL / 2) as i32, (y + CELL / 2) as i32)
}

/// Offset from a cell centre to the midpoint of its edge in `direction`.
fn edge_offset(direction: HexDirection) -> (i32, i32) {
    let h = (CELL / 2) as i32;
    match direction {
        HexDirection::NE => (h / 2, -h),
        HexDirection::E => (h, 0),
        HexDirection::SE => (h / 2, h),
        HexDirection::SW => (-h / 2, h),
        HexDirection::W => (-h, 0),
        HexDirection::NW => (-h / 2, -h),
    }
}

fn fill_cell(img: &mut RgbImage, snap: &MapSnapshot, col: usize, row: usize, color: [u8; 3]) {
    let (x0, y0) = cell_origin(snap, col, row);
    for y in y0..y0 + CELL {
        for x in x0..x0 + CELL {
            img.put_pixel(x, y, Rgb(color));
        }
    }
}

fn draw_line(img: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: [u8; 3]) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).max(1);
    for i in 0..=steps {
        let x = from.0 + (to.0 - from.0) * i / steps;
        let y = from.1 + (to.1 - from.1) * i / steps;
        if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }
}

/// Draw a segment from the cell centre to each edge flagged by `mask`.
fn draw_spokes(img: &mut RgbImage, snap: &MapSnapshot, col: usize, row: usize, mask: u8, color: [u8; 3]) {
    let centre = cell_center(snap, col, row);
    for d in HexDirection::ALL {
        if mask & (1 << d.index()) != 0 {
            let (dx, dy) = edge_offset(d);
            draw_line(img, centre, (centre.0 + dx, centre.1 + dy), color);
        }
    }
}

fn river_mask(rec: &CellRecord) -> u8 {
    [rec.incoming_river, rec.outgoing_river]
        .into_iter()
        .filter_map(unpack_river)
        .fold(0, |mask, d| mask | (1 << d.index()))
}

fn blank(snap: &MapSnapshot) -> RgbImage {
    RgbImage::new(snap.width as u32 * CELL + CELL / 2, snap.height as u32 * CELL)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let snap = match &args.input {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            MapSnapshot::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => {
            println!("Generating {}×{} map (seed {})…", args.width, args.height, args.seed);
            let config = GeneratorConfig { seed: args.seed, ..GeneratorConfig::default() };
            let mut generator = MapGenerator::new(config)?;
            generator.generate(args.width, args.height, false)?.grid.snapshot()
        }
    };

    fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;

    // ── 1. terrain.png: biomes, water, rivers and roads ─────────────────────
    {
        let mut img = blank(&snap);
        for row in 0..snap.height {
            for col in 0..snap.width {
                let rec = snap.cell(col, row);
                let color = if rec.is_underwater() {
                    water_color(i32::from(rec.water_level) - i32::from(rec.elevation))
                } else {
                    terrain_color(rec.terrain)
                };
                fill_cell(&mut img, &snap, col, row, color);
            }
        }
        for row in 0..snap.height {
            for col in 0..snap.width {
                let rec = snap.cell(col, row);
                draw_spokes(&mut img, &snap, col, row, rec.roads, [160, 60, 30]);
                draw_spokes(&mut img, &snap, col, row, river_mask(rec), [30, 90, 230]);
            }
        }
        let path = args.output.join("terrain.png");
        img.save(&path).with_context(|| format!("failed to save {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    // ── 2. elevation.png ────────────────────────────────────────────────────
    {
        let mut img = blank(&snap);
        for row in 0..snap.height {
            for col in 0..snap.width {
                fill_cell(&mut img, &snap, col, row, gray(snap.cell(col, row).elevation));
            }
        }
        let path = args.output.join("elevation.png");
        img.save(&path).with_context(|| format!("failed to save {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    // ── 3. settlements.png: towns red, farms yellow, walls outlined ─────────
    {
        let mut img = blank(&snap);
        for row in 0..snap.height {
            for col in 0..snap.width {
                let rec = snap.cell(col, row);
                let color = if rec.is_underwater() {
                    [40, 60, 110]
                } else if rec.urban_level > 0 {
                    let v = 120 + 45 * rec.urban_level;
                    [v, 30, 30]
                } else if rec.farm_level > 0 {
                    let v = 140 + 35 * rec.farm_level;
                    [v, v, 40]
                } else {
                    [90, 90, 90]
                };
                fill_cell(&mut img, &snap, col, row, color);
                if rec.walled {
                    let (x0, y0) = cell_origin(&snap, col, row);
                    for i in 0..CELL {
                        img.put_pixel(x0 + i, y0, Rgb([0, 0, 0]));
                        img.put_pixel(x0, y0 + i, Rgb([0, 0, 0]));
                    }
                }
            }
        }
        let path = args.output.join("settlements.png");
        img.save(&path).with_context(|| format!("failed to save {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("Done.");
    Ok(())
}
