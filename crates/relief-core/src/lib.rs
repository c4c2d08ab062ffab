//! Midpoint-displacement heightmap generation.
//!
//! A [`HeightField`] of `2^n + 1` cells per side is seeded at its four corners
//! and filled by repeatedly estimating the edge and center midpoints of ever
//! smaller squares, adding noise whose bound halves at every level.
pub mod error;
pub mod generator;
pub mod heightfield;
pub mod random;
pub mod region;
pub mod subdivision;
pub mod waves;

pub use error::{ReliefError, Result};
pub use generator::{EngineMode, GenerationParams, GenerationResult, TerrainGenerator};
pub use heightfield::{Corner, HeightField};
pub use random::{RandomSource, RandomSourceError, SeededSource};
pub use region::Region;
pub use subdivision::{subdivide, Subdivision, SubdivisionStats};
pub use waves::subdivide_in_waves;
