//! Shared test helpers for integration tests, benchmarks and fuzz targets.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::dimension::{DIMENSION_COUNT, Dimension, Dimensions};
use crate::sample::Sample;

// ===========================================================================
// Sample constructors
// ===========================================================================

pub fn sample(height: u64, time: u64, complexity: [u64; DIMENSION_COUNT]) -> Sample {
    Sample::new(height, time, complexity)
}

/// Sample with `value` in the bandwidth slot and zero elsewhere.
pub fn bandwidth_sample(height: u64, time: u64, value: u64) -> Sample {
    dimension_sample(Dimension::Bandwidth, height, time, value)
}

/// Sample with `value` in one slot and zero elsewhere.
pub fn dimension_sample(dimension: Dimension, height: u64, time: u64, value: u64) -> Sample {
    let mut complexity = Dimensions::EMPTY;
    complexity[dimension] = value;
    Sample::new(height, time, complexity)
}

/// Build one-second-spaced bandwidth samples from a value list, heights from 1.
pub fn bandwidth_series(values: &[u64]) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| bandwidth_sample(i as u64 + 1, i as u64, v))
        .collect()
}

/// Idle block, a two-block burst of 10, idle block; one second apart.
pub fn two_block_burst() -> Vec<Sample> {
    bandwidth_series(&[0, 10, 10, 0])
}

// ===========================================================================
// Synthetic histories
// ===========================================================================

/// Deterministic splitmix64 stream for synthetic histories.
#[derive(Debug, Clone)]
pub struct SplitMix(u64);

impl SplitMix {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform value in `0..bound` (`bound > 0`).
    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

/// A history of `len` blocks with irregular spacing, occasional empty
/// blocks, and bursts of heavy demand every few hundred blocks.
pub fn synthetic_history(len: usize, seed: u64) -> Vec<Sample> {
    let mut rng = SplitMix::new(seed);
    let mut time = 1_600_000_000u64;
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        time += rng.below(4);
        let bursting = (i / 50) % 7 == 3;
        let complexity = if rng.below(10) == 0 {
            Dimensions::EMPTY
        } else {
            let scale = if bursting { 20 } else { 1 };
            Dimensions::from_fn(|d| (rng.below(1_000) + 10 * d.index() as u64) * scale)
        };
        out.push(Sample::new(i as u64 + 1, time, complexity));
    }
    out
}
