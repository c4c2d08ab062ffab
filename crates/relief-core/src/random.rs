//! Bounded integer randomness for corner seeding and midpoint noise.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RandomSourceError {
    #[error("empty range [{low}, {high}]")]
    EmptyRange { low: i64, high: i64 },
    #[error("random source exhausted")]
    Exhausted,
}

/// Source of uniformly distributed integers with inclusive bounds.
pub trait RandomSource {
    fn next_int_in_range(&mut self, low: i64, high: i64) -> Result<i64, RandomSourceError>;

    /// Signed noise sample in `[-bound, bound]`.
    fn noise(&mut self, bound: u32) -> Result<i64, RandomSourceError> {
        let b = i64::from(bound);
        self.next_int_in_range(-b, b)
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_int_in_range(&mut self, low: i64, high: i64) -> Result<i64, RandomSourceError> {
        (**self).next_int_in_range(low, high)
    }
}

/// Reproducible source backed by `StdRng::seed_from_u64`.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl RandomSource for SeededSource {
    fn next_int_in_range(&mut self, low: i64, high: i64) -> Result<i64, RandomSourceError> {
        if low > high {
            return Err(RandomSourceError::EmptyRange { low, high });
        }
        Ok(self.rng.gen_range(low..=high))
    }
}
