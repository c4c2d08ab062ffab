//! Generation orchestrator: parameters → seeded corners → subdivision.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ReliefError, Result};
use crate::heightfield::{Corner, HeightField, MAX_EXPONENT};
use crate::random::{RandomSource, SeededSource};
use crate::subdivision::{subdivide, SubdivisionStats};
use crate::waves::subdivide_in_waves;

/// Largest corner magnitude accepted by [`GenerationParams::validate`].
/// Leaves headroom for four-corner sums and accumulated `u32` noise.
pub const MAX_CORNER_MAGNITUDE: i64 = i64::MAX / 8;

/// Which engine drains the region queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// One region at a time, FIFO.
    #[default]
    Serial,
    /// One depth level at a time; parallel with the `threading` feature.
    Waves,
}

/// User-facing generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub seed: u64,
    /// Grid exponent; the grid has `2^n + 1` cells per side.
    pub n: u32,
    /// Noise bound at the root; halved at every level.
    pub roughness: u32,
    /// Inclusive range for the four corner elevations.
    pub corner_low: i64,
    pub corner_high: i64,
    pub mode: EngineMode,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: 42,
            n: 9,
            roughness: 200,
            corner_low: 0,
            corner_high: 256,
            mode: EngineMode::Serial,
        }
    }
}

impl GenerationParams {
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Reject bad sizes and corner ranges before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.n < 1 {
            return Err(ReliefError::InvalidSize { n: self.n });
        }
        if self.n > MAX_EXPONENT {
            return Err(ReliefError::SizeTooLarge { n: self.n, max: MAX_EXPONENT });
        }
        check_corner_range(self.corner_low, self.corner_high)
    }
}

/// Output of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub heightfield: HeightField,
    pub stats: SubdivisionStats,
}

fn check_corner_range(low: i64, high: i64) -> Result<()> {
    let in_bounds = |v: i64| (-MAX_CORNER_MAGNITUDE..=MAX_CORNER_MAGNITUDE).contains(&v);
    if low > high || !in_bounds(low) || !in_bounds(high) {
        return Err(ReliefError::InvalidCornerRange { low, high });
    }
    Ok(())
}

/// Draw the four corners (TL, TR, BL, BR) from `[low, high]`.
pub fn seed_corners<S: RandomSource + ?Sized>(
    hf: &mut HeightField,
    source: &mut S,
    low: i64,
    high: i64,
) -> Result<()> {
    check_corner_range(low, high)?;
    for corner in Corner::ALL {
        let v = source.next_int_in_range(low, high)?;
        hf.set_corner(corner, v);
    }
    Ok(())
}

pub struct TerrainGenerator;

impl TerrainGenerator {
    pub fn new() -> Self { Self }

    /// Generate a heightfield from a `StdRng` seeded with `params.seed`.
    pub fn generate(&self, params: &GenerationParams) -> Result<GenerationResult> {
        self.generate_with(params, &mut SeededSource::new(params.seed))
    }

    /// Generate with a caller-supplied random source.
    pub fn generate_with<S: RandomSource + ?Sized>(
        &self,
        params: &GenerationParams,
        source: &mut S,
    ) -> Result<GenerationResult> {
        params.validate()?;
        let mut hf = HeightField::new(params.n)?;
        seed_corners(&mut hf, source, params.corner_low, params.corner_high)?;
        debug!(
            tl = hf.corner(Corner::TopLeft),
            tr = hf.corner(Corner::TopRight),
            bl = hf.corner(Corner::BottomLeft),
            br = hf.corner(Corner::BottomRight),
            "corners seeded"
        );

        let stats = match params.mode {
            EngineMode::Serial => subdivide(&mut hf, params.roughness, source)?,
            EngineMode::Waves => subdivide_in_waves(&mut hf, params.roughness, source)?,
        };
        info!(
            side = hf.side(),
            regions = stats.regions,
            min = hf.min_elevation(),
            max = hf.max_elevation(),
            "heightfield generated"
        );

        Ok(GenerationResult { heightfield: hf, stats })
    }
}

impl Default for TerrainGenerator {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::testing::Scripted;

    #[test]
    fn default_params_generate_full_grid() {
        let params = GenerationParams { n: 6, ..GenerationParams::default() };
        let result = TerrainGenerator::new().generate(&params).unwrap();
        assert_eq!(result.heightfield.side(), 65);
        assert_eq!(result.stats.levels, 6);

        let hf = &result.heightfield;
        assert!(hf.max_elevation() > hf.min_elevation(), "terrain must not be flat");
        for corner in Corner::ALL {
            assert!((0..=256).contains(&hf.corner(corner)));
        }
    }

    #[test]
    fn same_seed_gives_identical_grids() {
        let params = GenerationParams { n: 7, seed: 2024, ..GenerationParams::default() };
        let gen = TerrainGenerator::new();
        let a = gen.generate(&params).unwrap();
        let b = gen.generate(&params).unwrap();
        assert_eq!(a.heightfield, b.heightfield);
    }

    #[test]
    fn engine_modes_agree() {
        let serial = GenerationParams { n: 6, seed: 7, ..GenerationParams::default() };
        let waves = GenerationParams { mode: EngineMode::Waves, ..serial.clone() };
        let gen = TerrainGenerator::new();
        assert_eq!(
            gen.generate(&serial).unwrap().heightfield,
            gen.generate(&waves).unwrap().heightfield
        );
    }

    #[test]
    fn scripted_corners_are_seeded_in_order() {
        let params = GenerationParams { n: 1, roughness: 0, ..GenerationParams::default() };
        // Four corners then five zero-noise midpoints.
        let mut src = Scripted::new(&[10, 20, 30, 40, 0, 0, 0, 0, 0]);
        let hf = TerrainGenerator::new().generate_with(&params, &mut src).unwrap().heightfield;
        assert_eq!(hf.rows().collect::<Vec<_>>(), vec![&[10, 15, 20][..], &[20, 25, 30][..], &[30, 35, 40][..]]);
    }

    #[test]
    fn zero_exponent_is_rejected_before_allocation() {
        let params = GenerationParams { n: 0, ..GenerationParams::default() };
        assert!(matches!(
            TerrainGenerator::new().generate(&params),
            Err(ReliefError::InvalidSize { n: 0 })
        ));
    }

    #[test]
    fn inverted_corner_range_is_rejected() {
        let params = GenerationParams { corner_low: 10, corner_high: 0, ..GenerationParams::default() };
        assert!(matches!(params.validate(), Err(ReliefError::InvalidCornerRange { .. })));
    }

    #[test]
    fn extreme_corner_range_is_rejected() {
        let params = GenerationParams {
            n: 2,
            corner_low: i64::MAX - 10,
            corner_high: i64::MAX,
            ..GenerationParams::default()
        };
        assert!(matches!(params.validate(), Err(ReliefError::InvalidCornerRange { .. })));
        assert!(matches!(
            TerrainGenerator::new().generate(&params),
            Err(ReliefError::InvalidCornerRange { .. })
        ));

        let params = GenerationParams { corner_low: i64::MIN, corner_high: 0, ..params };
        assert!(params.validate().is_err());
    }

    #[test]
    fn widest_accepted_corner_range_generates() {
        let params = GenerationParams {
            n: 4,
            corner_low: -MAX_CORNER_MAGNITUDE,
            corner_high: MAX_CORNER_MAGNITUDE,
            roughness: u32::MAX,
            ..GenerationParams::default()
        };
        let hf = TerrainGenerator::new().generate(&params).unwrap().heightfield;
        assert!(hf.normalized().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn params_json_fills_missing_fields_with_defaults() {
        let params = GenerationParams::from_json(r#"{"n": 4, "mode": "waves"}"#).unwrap();
        assert_eq!(params.n, 4);
        assert_eq!(params.mode, EngineMode::Waves);
        assert_eq!(params.roughness, 200);
        assert_eq!(params.seed, 42);
    }

    #[test]
    fn bad_params_json_is_reported() {
        assert!(matches!(GenerationParams::from_json("{\"n\": -1}"), Err(ReliefError::Params(_))));
    }
}
