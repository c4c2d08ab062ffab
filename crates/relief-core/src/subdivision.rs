//! Queue-driven midpoint displacement.
//!
//! Regions are drained first-in first-out, so every region is processed after
//! the coarser region that wrote its corners.
use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ReliefError, Result};
use crate::heightfield::HeightField;
use crate::random::RandomSource;
use crate::region::Region;

/// Counters collected over one subdivision run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubdivisionStats {
    pub regions: usize,
    /// Distinct region sizes visited; equals the grid exponent.
    pub levels: u32,
    pub cells_written: usize,
    /// Roughness of the finest level.
    pub final_roughness: u32,
    #[serde(skip)]
    level_side: usize,
}

impl SubdivisionStats {
    pub(crate) fn record(&mut self, region: &Region, writes: usize) {
        if region.side() != self.level_side {
            self.levels += 1;
            self.level_side = region.side();
        }
        self.regions += 1;
        self.cells_written += writes;
        self.final_roughness = region.roughness;
    }
}

/// Midpoint displacement over a FIFO work queue.
pub struct Subdivision {
    queue: VecDeque<Region>,
    last: usize,
    stats: SubdivisionStats,
}

impl Subdivision {
    /// Enqueue the root region covering the whole of `hf`.
    pub fn new(hf: &HeightField, roughness: u32) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(Region::root(hf.side(), roughness));
        Self { queue, last: hf.last(), stats: SubdivisionStats::default() }
    }

    /// Regions waiting to be processed, front first.
    pub fn pending(&self) -> impl Iterator<Item = &Region> {
        self.queue.iter()
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn stats(&self) -> SubdivisionStats {
        self.stats
    }

    /// Process the front region and enqueue its children.
    /// Returns the processed region, or `None` once the queue is empty.
    ///
    /// `hf` must have the size of the heightfield passed to [`Subdivision::new`];
    /// otherwise `GridMismatch` is returned and nothing is written.
    pub fn step<S: RandomSource + ?Sized>(
        &mut self,
        hf: &mut HeightField,
        source: &mut S,
    ) -> Result<Option<Region>> {
        if hf.last() != self.last {
            return Err(ReliefError::GridMismatch { expected: self.last + 1, actual: hf.side() });
        }
        let Some(region) = self.queue.pop_front() else {
            return Ok(None);
        };

        let noise = region.draw_noise(self.last, source)?;
        let mut writes = 0;
        for d in region.displacements(hf, &noise) {
            hf.set(d.row, d.col, d.value);
            writes += 1;
        }
        self.stats.record(&region, writes);

        if region.is_subdividable() {
            self.queue.extend(region.split());
        }
        Ok(Some(region))
    }

    /// Drain the queue.
    pub fn run<S: RandomSource + ?Sized>(
        mut self,
        hf: &mut HeightField,
        source: &mut S,
    ) -> Result<SubdivisionStats> {
        let mut level_side = 0;
        while let Some(region) = self.step(hf, source)? {
            if region.side() != level_side {
                level_side = region.side();
                trace!(side = level_side, roughness = region.roughness, "subdivision level");
            }
        }
        Ok(self.stats)
    }
}

/// Fill `hf` by midpoint displacement, starting from its four corners.
pub fn subdivide<S: RandomSource + ?Sized>(
    hf: &mut HeightField,
    roughness: u32,
    source: &mut S,
) -> Result<SubdivisionStats> {
    debug!(side = hf.side(), roughness, "subdividing heightfield");
    let stats = Subdivision::new(hf, roughness).run(hf, source)?;
    debug!(regions = stats.regions, cells = stats.cells_written, "subdivision complete");
    Ok(stats)
}
