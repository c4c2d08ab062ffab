/// Command-line front end: generate a midpoint-displacement heightfield and
/// write it as JSON.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use relief_core::generator::{EngineMode, GenerationParams, TerrainGenerator};
use relief_core::subdivision::SubdivisionStats;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "relief", about = "Midpoint-displacement heightmap generator")]
struct Args {
    /// JSON file with generation parameters; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid exponent: the grid has 2^n + 1 cells per side.
    #[arg(short = 'n', long = "exponent")]
    n: Option<u32>,

    /// Initial noise bound, halved at every level.
    #[arg(short, long)]
    roughness: Option<u32>,

    /// Seed for the random source.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Process one depth level at a time (parallel with the `threading` feature).
    #[arg(long)]
    waves: bool,

    /// Raise every cell below this elevation up to it.
    #[arg(long, allow_negative_numbers = true)]
    sea_level: Option<i64>,

    /// Output path for the heightfield JSON (stdout when omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a JSON run report (params, stats, elevation range) to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    params: &'a GenerationParams,
    stats: SubdivisionStats,
    min_elevation: i64,
    max_elevation: i64,
    clipped_cells: usize,
}

fn resolve_params(args: &Args) -> Result<GenerationParams> {
    let mut params = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            GenerationParams::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GenerationParams::default(),
    };

    if let Some(n) = args.n {
        params.n = n;
    }
    if let Some(roughness) = args.roughness {
        params.roughness = roughness;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if args.waves {
        params.mode = EngineMode::Waves;
    }
    params.validate()?;
    Ok(params)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let params = resolve_params(&args)?;
    tracing::info!(n = params.n, roughness = params.roughness, seed = params.seed, mode = ?params.mode, "generating");

    let result = TerrainGenerator::new().generate(&params)?;
    let mut hf = result.heightfield;

    let clipped_cells = match args.sea_level {
        Some(level) => {
            let clipped = hf.clip_to_sea_level(level);
            tracing::info!(level, clipped, "clipped to sea level");
            clipped
        }
        None => 0,
    };

    let json = serde_json::to_string(&hf)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    if let Some(path) = &args.report {
        let report = Report {
            params: &params,
            stats: result.stats,
            min_elevation: hf.min_elevation(),
            max_elevation: hf.max_elevation(),
            clipped_cells,
        };
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["relief", "-n", "5", "--roughness", "30", "--waves"]);
        let params = resolve_params(&args).unwrap();
        assert_eq!(params.n, 5);
        assert_eq!(params.roughness, 30);
        assert_eq!(params.seed, 42);
        assert_eq!(params.mode, EngineMode::Waves);
    }

    #[test]
    fn flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("relief-cli-{}.json", std::process::id()));
        fs::write(&path, r#"{"n": 3, "seed": 9, "roughness": 50}"#).unwrap();

        let args = Args::parse_from(["relief", "--config", path.to_str().unwrap(), "--seed", "11"]);
        let params = resolve_params(&args).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(params.n, 3);
        assert_eq!(params.roughness, 50);
        assert_eq!(params.seed, 11);
    }

    #[test]
    fn invalid_exponent_flag_is_rejected() {
        let args = Args::parse_from(["relief", "-n", "0"]);
        assert!(resolve_params(&args).is_err());
    }

    #[test]
    fn negative_sea_level_parses() {
        let args = Args::parse_from(["relief", "--sea-level", "-20"]);
        assert_eq!(args.sea_level, Some(-20));
    }
}
