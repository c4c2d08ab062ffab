//! Heightfield renderer: writes a colour-ramped terrain PNG and a grayscale
//! heightmap PNG, after optional sea-level clipping.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use relief_core::generator::{GenerationParams, TerrainGenerator};
use relief_core::heightfield::HeightField;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "visualize", about = "Render a heightfield to PNG")]
struct Args {
    /// Heightfield JSON written by `relief`; a fresh grid is generated when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Grid exponent for a fresh generation.
    #[arg(short = 'n', long = "exponent", default_value_t = 9)]
    n: u32,

    /// Seed for a fresh generation.
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Initial roughness for a fresh generation.
    #[arg(short, long, default_value_t = 200)]
    roughness: u32,

    /// Clip everything below this elevation before rendering.
    #[arg(long, allow_negative_numbers = true)]
    sea_level: Option<i64>,

    /// Output directory.
    #[arg(short, long, default_value = "data/debug")]
    out_dir: PathBuf,
}

// ── Colour helpers ────────────────────────────────────────────────────────────

/// Stops of an earth-tone ramp: deep water → shore → lowland → highland → snow.
const RAMP: [(f32, [u8; 3]); 6] = [
    (0.00, [ 20,  40, 110]),
    (0.10, [ 60, 120, 170]),
    (0.25, [120, 170, 110]),
    (0.55, [160, 150,  90]),
    (0.80, [140, 110,  80]),
    (1.00, [250, 250, 250]),
];

fn lerp(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Normalized height [0, 1] → terrain colour.
fn terrain_color(h: f32) -> [u8; 3] {
    let h = h.clamp(0.0, 1.0);
    for pair in RAMP.windows(2) {
        let (lo, c0) = pair[0];
        let (hi, c1) = pair[1];
        if h <= hi {
            return lerp(c0, c1, (h - lo) / (hi - lo));
        }
    }
    RAMP[RAMP.len() - 1].1
}

fn gray(h: f32) -> [u8; 3] {
    let c = (h.clamp(0.0, 1.0) * 255.0) as u8;
    [c, c, c]
}

fn render(hf: &HeightField, path: &Path, color: fn(f32) -> [u8; 3]) -> Result<()> {
    let side = hf.side() as u32;
    let norm = hf.normalized();
    let mut img = image::RgbImage::new(side, side);
    for (i, &h) in norm.iter().enumerate() {
        let (r, c) = (i as u32 / side, i as u32 % side);
        img.put_pixel(c, r, image::Rgb(color(h)));
    }
    img.save(path).with_context(|| format!("failed to save {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut hf = match &args.input {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<HeightField>(&json)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => {
            let params = GenerationParams {
                n: args.n,
                seed: args.seed,
                roughness: args.roughness,
                ..GenerationParams::default()
            };
            tracing::info!(n = args.n, seed = args.seed, "generating heightfield");
            TerrainGenerator::new().generate(&params)?.heightfield
        }
    };

    if let Some(level) = args.sea_level {
        let clipped = hf.clip_to_sea_level(level);
        tracing::info!(level, clipped, "clipped to sea level");
    }

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("cannot create {}", args.out_dir.display()))?;

    render(&hf, &args.out_dir.join("terrain.png"), terrain_color)?;
    render(&hf, &args.out_dir.join("heightmap.png"), gray)?;

    Ok(())
}
