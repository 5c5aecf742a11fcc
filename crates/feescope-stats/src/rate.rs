//! Robust per-dimension rate estimation from consecutive-block deltas.
//!
//! Blocks are irregularly spaced, so a per-block cap says little about
//! sustained load. Instead each block's complexity is divided by the time
//! since its predecessor, and a quantile of those per-second derivatives is
//! taken as the dimension's "typical" rate.

use serde::{Deserialize, Serialize};
use tracing::debug;

use feescope_core::dimension::{DIMENSION_COUNT, Dimension, Dimensions};
use feescope_core::error::AnalysisError;
use feescope_core::fixed::{Rate, rate_per_second, rate_to_u64};
use feescope_core::sample::{Sample, skip_empty};
use feescope_core::window::{HeightRange, filter_by_height};

/// Quantile used for the typical time step between blocks.
const MEDIAN: f64 = 0.5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Typical block spacing and per-dimension sustained rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateStatistics {
    /// Median seconds between consecutive non-empty blocks.
    pub median_time_step: u64,
    /// Quantile of per-second complexity, truncated to whole units.
    pub target_rates: Dimensions,
}

/// Unsorted derivative series over consecutive samples.
///
/// Entry `i` describes the step from sample `i` to sample `i + 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derivatives {
    /// Seconds between the two blocks, at least one.
    pub time_steps: Vec<u64>,
    /// Per-dimension complexity per second of the later block.
    pub rates: [Vec<Rate>; DIMENSION_COUNT],
}

impl Derivatives {
    pub fn len(&self) -> usize {
        self.time_steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_steps.is_empty()
    }

    pub fn rates_of(&self, dimension: Dimension) -> &[Rate] {
        &self.rates[dimension.index()]
    }
}

// ---------------------------------------------------------------------------
// Quantile helpers
// ---------------------------------------------------------------------------

/// Index of the `quantile` element in a sorted series of `len` values.
///
/// `floor(quantile * len)`, clamped to the last element so `quantile = 1.0`
/// selects the maximum. `len` must be non-zero.
pub fn percentile_index(len: usize, quantile: f64) -> usize {
    debug_assert!(len > 0);
    let raw = (quantile * len as f64).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(len - 1)
    }
}

/// The `quantile` element of an already sorted slice.
pub fn quantile_of_sorted<T: Copy>(sorted: &[T], quantile: f64) -> Option<T> {
    if sorted.is_empty() {
        return None;
    }
    Some(sorted[percentile_index(sorted.len(), quantile)])
}

fn check_quantile(quantile: f64) -> Result<(), AnalysisError> {
    if quantile > 0.0 && quantile <= 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidQuantile(quantile))
    }
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

/// Time steps and per-second rates between each consecutive pair.
///
/// A zero (or negative) time step counts as one second.
pub fn derivatives(samples: &[Sample]) -> Derivatives {
    let steps = samples.len().saturating_sub(1);
    let mut out = Derivatives {
        time_steps: Vec::with_capacity(steps),
        rates: std::array::from_fn(|_| Vec::with_capacity(steps)),
    };
    for pair in samples.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let dt = cur.time.saturating_sub(prev.time).max(1);
        out.time_steps.push(dt);
        for (series, (_, value)) in out.rates.iter_mut().zip(cur.complexity.iter()) {
            series.push(rate_per_second(value, dt));
        }
    }
    out
}

/// Estimate the typical block spacing and per-dimension rates.
///
/// Empty blocks and blocks below `min_height` are dropped first; at least two
/// samples must remain. Each dimension's rate is the `quantile` element of its
/// sorted derivative series.
pub fn estimate(
    samples: &[Sample],
    min_height: u64,
    quantile: f64,
) -> Result<RateStatistics, AnalysisError> {
    check_quantile(quantile)?;

    let qualifying = filter_by_height(&skip_empty(samples), HeightRange::from_min(min_height));
    if qualifying.len() < 2 {
        return Err(AnalysisError::InsufficientSamples {
            needed: 2,
            found: qualifying.len(),
        });
    }

    let Derivatives {
        mut time_steps,
        mut rates,
    } = derivatives(&qualifying);

    time_steps.sort_unstable();
    let median_time_step = time_steps[percentile_index(time_steps.len(), MEDIAN)];

    let mut target_rates = Dimensions::EMPTY;
    for d in Dimension::ALL {
        let series = &mut rates[d.index()];
        series.sort_unstable();
        target_rates[d] = rate_to_u64(series[percentile_index(series.len(), quantile)]);
    }

    debug!(
        input = samples.len(),
        qualifying = qualifying.len(),
        min_height,
        quantile,
        median_time_step,
        %target_rates,
        "estimated target rates"
    );

    Ok(RateStatistics {
        median_time_step,
        target_rates,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
