//! Level-synchronous subdivision.
//!
//! All regions of one depth form a wave. Noise for a wave is drawn serially in
//! queue order, the wave's midpoints are then computed against a read-only grid
//! (in parallel with the `threading` feature), and finally written back. Regions
//! of a wave write disjoint cells and only read cells finalized by earlier waves,
//! so the result is identical to [`crate::subdivision::subdivide`] for the same
//! random source.
#[cfg(feature = "threading")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::Result;
use crate::heightfield::HeightField;
use crate::random::RandomSource;
use crate::region::{Displacement, MidpointNoise, Region};
use crate::subdivision::SubdivisionStats;

/// Fill `hf` one wave at a time.
pub fn subdivide_in_waves<S: RandomSource + ?Sized>(
    hf: &mut HeightField,
    roughness: u32,
    source: &mut S,
) -> Result<SubdivisionStats> {
    debug!(side = hf.side(), roughness, "subdividing heightfield in waves");
    let last = hf.last();
    let mut stats = SubdivisionStats::default();
    let mut wave = vec![Region::root(hf.side(), roughness)];

    while !wave.is_empty() {
        trace!(regions = wave.len(), side = wave[0].side(), roughness = wave[0].roughness, "wave");

        let noise = wave
            .iter()
            .map(|region| region.draw_noise(last, source))
            .collect::<std::result::Result<Vec<MidpointNoise>, _>>()?;

        let writes = plan_wave(hf, &wave, &noise);
        for (region, cells) in wave.iter().zip(&writes) {
            stats.record(region, cells.len());
        }
        for d in writes.into_iter().flatten() {
            hf.set(d.row, d.col, d.value);
        }

        wave = wave
            .iter()
            .filter(|region| region.is_subdividable())
            .flat_map(Region::split)
            .collect();
    }

    debug!(regions = stats.regions, cells = stats.cells_written, "wave subdivision complete");
    Ok(stats)
}

#[cfg(feature = "threading")]
fn plan_wave(hf: &HeightField, wave: &[Region], noise: &[MidpointNoise]) -> Vec<Vec<Displacement>> {
    wave.par_iter()
        .zip(noise.par_iter())
        .map(|(region, n)| region.displacements(hf, n).collect())
        .collect()
}

#[cfg(not(feature = "threading"))]
fn plan_wave(hf: &HeightField, wave: &[Region], noise: &[MidpointNoise]) -> Vec<Vec<Displacement>> {
    wave.iter()
        .zip(noise)
        .map(|(region, n)| region.displacements(hf, n).collect())
        .collect()
}
