use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};

/// Largest accepted grid exponent: 16385 × 16385 cells of i64 (~2 GiB).
pub const MAX_EXPONENT: u32 = 14;

/// One of the four seeded corners of a heightfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Corners in seeding order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// A square heightfield of integer elevations, row-major, `2^n + 1` cells per side.
/// Deserializing re-checks the size invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHeightField")]
pub struct HeightField {
    /// Grid exponent; `side == 2^n + 1`.
    n: u32,
    side: usize,
    /// Row-major elevation values.
    data: Vec<i64>,
}

/// Unchecked wire form of [`HeightField`].
#[derive(Deserialize)]
struct RawHeightField {
    n: u32,
    side: usize,
    data: Vec<i64>,
}

impl TryFrom<RawHeightField> for HeightField {
    type Error = ReliefError;

    fn try_from(raw: RawHeightField) -> Result<Self> {
        let hf = Self { n: raw.n, side: raw.side, data: raw.data };
        hf.validate()?;
        Ok(hf)
    }
}

impl HeightField {
    /// Create a zero-filled heightfield with `2^n + 1` cells per side.
    pub fn new(n: u32) -> Result<Self> {
        let side = side_for_exponent(n)?;
        Ok(Self { n, side, data: vec![0; side * side] })
    }

    /// Build a heightfield from existing row-major data.
    pub fn from_data(n: u32, data: Vec<i64>) -> Result<Self> {
        let side = side_for_exponent(n)?;
        let hf = Self { n, side, data };
        hf.validate()?;
        Ok(hf)
    }

    /// Check `side == 2^n + 1` and `data.len() == side²`.
    pub fn validate(&self) -> Result<()> {
        let side = side_for_exponent(self.n)?;
        let expected = side * side;
        if self.side != side {
            return Err(ReliefError::Malformed { expected, actual: self.side * self.side });
        }
        if self.data.len() != expected {
            return Err(ReliefError::Malformed { expected, actual: self.data.len() });
        }
        Ok(())
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn exponent(&self) -> u32 {
        self.n
    }

    /// Index of the last row and column.
    #[inline]
    pub fn last(&self) -> usize {
        self.side - 1
    }

    pub fn data(&self) -> &[i64] {
        &self.data
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[i64]> {
        self.data.chunks_exact(self.side)
    }

    /// Panics if `row` or `col` is outside the grid.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[self.index(row, col)]
    }

    /// Panics if `row` or `col` is outside the grid.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: i64) {
        let idx = self.index(row, col);
        self.data[idx] = val;
    }

    #[inline]
    pub(crate) fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.side && col < self.side,
            "cell ({row}, {col}) outside {0}×{0} heightfield",
            self.side
        );
        row * self.side + col
    }

    /// (row, col) of a corner.
    pub fn corner_position(&self, corner: Corner) -> (usize, usize) {
        let last = self.last();
        match corner {
            Corner::TopLeft => (0, 0),
            Corner::TopRight => (0, last),
            Corner::BottomLeft => (last, 0),
            Corner::BottomRight => (last, last),
        }
    }

    pub fn corner(&self, corner: Corner) -> i64 {
        let (r, c) = self.corner_position(corner);
        self.get(r, c)
    }

    pub fn set_corner(&mut self, corner: Corner, val: i64) {
        let (r, c) = self.corner_position(corner);
        self.set(r, c, val);
    }

    pub fn min_elevation(&self) -> i64 {
        self.data.iter().copied().min().unwrap_or(0)
    }

    pub fn max_elevation(&self) -> i64 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Raise every cell below `level` to `level`. Returns the number of cells changed.
    pub fn clip_to_sea_level(&mut self, level: i64) -> usize {
        let mut clipped = 0;
        for v in self.data.iter_mut().filter(|v| **v < level) {
            *v = level;
            clipped += 1;
        }
        clipped
    }

    /// Elevations rescaled to [0, 1]. A flat field maps to all zeros.
    pub fn normalized(&self) -> Vec<f32> {
        let min = i128::from(self.min_elevation());
        let range = i128::from(self.max_elevation()) - min;
        if range <= 0 {
            return vec![0.0; self.data.len()];
        }
        self.data
            .iter()
            .map(|&v| ((i128::from(v) - min) as f64 / range as f64) as f32)
            .collect()
    }
}

fn side_for_exponent(n: u32) -> Result<usize> {
    if n < 1 {
        return Err(ReliefError::InvalidSize { n });
    }
    if n > MAX_EXPONENT {
        return Err(ReliefError::SizeTooLarge { n, max: MAX_EXPONENT });
    }
    Ok((1usize << n) + 1)
}
