//! Square work items of the subdivision queue and the midpoint math applied to them.
//!
//! Coordinates follow the cartesian convention: `x` is the column, `y` the row.
use serde::{Deserialize, Serialize};

use crate::heightfield::HeightField;
use crate::random::{RandomSource, RandomSourceError};

/// A square sub-area of the grid pending midpoint computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
    /// Noise bound for every midpoint written by this region.
    pub roughness: u32,
}

/// The five points a region estimates, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Midpoint {
    Left,
    Right,
    Top,
    Bottom,
    Center,
}

impl Midpoint {
    pub const ALL: [Midpoint; 5] = [
        Midpoint::Left,
        Midpoint::Right,
        Midpoint::Top,
        Midpoint::Bottom,
        Midpoint::Center,
    ];
}

/// Elevations at a region's four corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerValues {
    pub top_left: i64,
    pub top_right: i64,
    pub bottom_left: i64,
    pub bottom_right: i64,
}

impl CornerValues {
    /// Floor-averaged estimate of a midpoint before noise.
    ///
    /// Sums are taken in `i128`; the mean of `i64` values always fits back.
    pub fn estimate(&self, m: Midpoint) -> i64 {
        let [tl, tr, bl, br] =
            [self.top_left, self.top_right, self.bottom_left, self.bottom_right].map(i128::from);
        let avg = match m {
            Midpoint::Left => (tl + bl).div_euclid(2),
            Midpoint::Right => (tr + br).div_euclid(2),
            Midpoint::Top => (tl + tr).div_euclid(2),
            Midpoint::Bottom => (bl + br).div_euclid(2),
            Midpoint::Center => (tl + tr + bl + br).div_euclid(4),
        };
        avg as i64
    }
}

/// One cell assignment produced by processing a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displacement {
    pub row: usize,
    pub col: usize,
    pub value: i64,
}

/// Noise drawn for one region; `None` where the region does not write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MidpointNoise([Option<i64>; 5]);

impl Region {
    /// The region covering a whole grid of `side` cells per side.
    pub fn root(side: usize, roughness: u32) -> Self {
        Self { x0: 0, y0: 0, x1: side - 1, y1: side - 1, roughness }
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.y1 - self.y0
    }

    /// `(cx, cy)`.
    #[inline]
    pub fn center(&self) -> (usize, usize) {
        ((self.x0 + self.x1) / 2, (self.y0 + self.y1) / 2)
    }

    /// Side 2 regions only have a center left to resolve.
    #[inline]
    pub fn is_subdividable(&self) -> bool {
        self.side() > 2
    }

    /// Quadrants in queue order (TL, TR, BL, BR), each with half the roughness.
    pub fn split(&self) -> [Region; 4] {
        let (cx, cy) = self.center();
        let roughness = self.roughness / 2;
        let Region { x0, y0, x1, y1, .. } = *self;
        [
            Region { x0, y0, x1: cx, y1: cy, roughness },
            Region { x0: cx, y0, x1, y1: cy, roughness },
            Region { x0, y0: cy, x1: cx, y1, roughness },
            Region { x0: cx, y0: cy, x1, y1, roughness },
        ]
    }

    /// (row, col) of a midpoint.
    pub fn position(&self, m: Midpoint) -> (usize, usize) {
        let (cx, cy) = self.center();
        match m {
            Midpoint::Left => (cy, self.x0),
            Midpoint::Right => (cy, self.x1),
            Midpoint::Top => (self.y0, cx),
            Midpoint::Bottom => (self.y1, cx),
            Midpoint::Center => (cy, cx),
        }
    }

    /// Whether this region owns the cell of `m` in a grid whose last index is `last`.
    ///
    /// A right or bottom edge is shared with the neighbouring region of the same
    /// level unless it lies on the grid border; the neighbour writes it as its
    /// left or top edge.
    pub fn writes(&self, m: Midpoint, last: usize) -> bool {
        match m {
            Midpoint::Right => self.x1 == last,
            Midpoint::Bottom => self.y1 == last,
            Midpoint::Left | Midpoint::Top | Midpoint::Center => true,
        }
    }

    /// Cells this region writes, in draw order.
    pub fn written_cells(&self, last: usize) -> impl Iterator<Item = (usize, usize)> {
        let region = *self;
        Midpoint::ALL
            .into_iter()
            .filter(move |&m| region.writes(m, last))
            .map(move |m| region.position(m))
    }

    pub fn corners(&self, hf: &HeightField) -> CornerValues {
        CornerValues {
            top_left: hf.get(self.y0, self.x0),
            top_right: hf.get(self.y0, self.x1),
            bottom_left: hf.get(self.y1, self.x0),
            bottom_right: hf.get(self.y1, self.x1),
        }
    }

    /// Draw one noise sample per written midpoint, in `Midpoint::ALL` order.
    pub fn draw_noise<S: RandomSource + ?Sized>(
        &self,
        last: usize,
        source: &mut S,
    ) -> Result<MidpointNoise, RandomSourceError> {
        let mut noise = MidpointNoise::default();
        for (slot, m) in noise.0.iter_mut().zip(Midpoint::ALL) {
            if self.writes(m, last) {
                *slot = Some(source.noise(self.roughness)?);
            }
        }
        Ok(noise)
    }

    /// Midpoint values from the current corner elevations plus `noise`.
    pub fn displacements(&self, hf: &HeightField, noise: &MidpointNoise) -> impl Iterator<Item = Displacement> {
        let region = *self;
        let corners = self.corners(hf);
        Midpoint::ALL
            .into_iter()
            .zip(noise.0)
            .filter_map(move |(m, n)| {
                let n = n?;
                let (row, col) = region.position(m);
                Some(Displacement { row, col, value: corners.estimate(m).saturating_add(n) })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn split_halves_side_and_roughness() {
        let root = Region::root(9, 7);
        let children = root.split();
        assert_eq!(children[0], Region { x0: 0, y0: 0, x1: 4, y1: 4, roughness: 3 });
        assert_eq!(children[1], Region { x0: 4, y0: 0, x1: 8, y1: 4, roughness: 3 });
        assert_eq!(children[2], Region { x0: 0, y0: 4, x1: 4, y1: 8, roughness: 3 });
        assert_eq!(children[3], Region { x0: 4, y0: 4, x1: 8, y1: 8, roughness: 3 });
        for c in children {
            assert_eq!(c.side(), root.side() / 2);
            assert_eq!(c.x1 - c.x0, c.y1 - c.y0);
        }
    }

    #[test]
    fn side_two_is_terminal() {
        assert!(!Region::root(3, 10).is_subdividable());
        assert!(Region::root(5, 10).is_subdividable());
    }

    #[test]
    fn floor_average_rounds_toward_negative_infinity() {
        let c = CornerValues { top_left: -3, top_right: 0, bottom_left: 0, bottom_right: 0 };
        assert_eq!(c.estimate(Midpoint::Top), -2);
        assert_eq!(c.estimate(Midpoint::Center), -1);
        assert_eq!(c.estimate(Midpoint::Bottom), 0);
    }

    #[test]
    fn estimate_does_not_overflow_at_extremes() {
        let c = CornerValues {
            top_left: i64::MAX,
            top_right: i64::MAX,
            bottom_left: i64::MAX - 1,
            bottom_right: i64::MIN,
        };
        assert_eq!(c.estimate(Midpoint::Top), i64::MAX);
        assert_eq!(c.estimate(Midpoint::Left), i64::MAX - 1);
        assert_eq!(c.estimate(Midpoint::Right), -1);

        let noise = MidpointNoise([Some(5), None, None, None, None]);
        let mut hf = HeightField::new(1).unwrap();
        hf.set(0, 0, i64::MAX);
        hf.set(2, 0, i64::MAX);
        let d: Vec<_> = Region::root(3, 5).displacements(&hf, &noise).collect();
        assert_eq!(d, vec![Displacement { row: 1, col: 0, value: i64::MAX }]);
    }

    #[test]
    fn sibling_regions_write_disjoint_cells() {
        let last = 8;
        let mut seen = HashSet::new();
        for child in Region::root(9, 0).split() {
            for cell in child.written_cells(last) {
                assert!(seen.insert(cell), "cell {cell:?} written twice");
            }
        }
        // Four centers, the internal cross (4 cells), and the border midpoints (8 cells).
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn root_writes_all_five_midpoints() {
        let root = Region::root(5, 1);
        assert_eq!(root.written_cells(4).count(), 5);
    }
}
