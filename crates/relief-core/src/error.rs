use thiserror::Error;

use crate::random::RandomSourceError;

/// Errors raised while building or subdividing a heightfield.
#[derive(Debug, Error)]
pub enum ReliefError {
    #[error("grid exponent must be at least 1, got {n}")]
    InvalidSize { n: u32 },
    #[error("grid exponent {n} exceeds the supported maximum of {max}")]
    SizeTooLarge { n: u32, max: u32 },
    #[error("malformed heightfield: expected {expected} cells, found {actual}")]
    Malformed { expected: usize, actual: usize },
    #[error("corner range [{low}, {high}] is empty or exceeds ±{max}", max = crate::generator::MAX_CORNER_MAGNITUDE)]
    InvalidCornerRange { low: i64, high: i64 },
    #[error("subdivision was set up for a {expected}×{expected} grid, got {actual}×{actual}")]
    GridMismatch { expected: usize, actual: usize },
    #[error("random source failed: {0}")]
    RandomSource(#[from] RandomSourceError),
    #[error("invalid parameters JSON: {0}")]
    Params(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReliefError>;
