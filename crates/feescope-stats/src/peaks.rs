//! Peak detection on a single dimension and per-dimension ranking.
//!
//! A peak is a maximal run of consecutive blocks whose value stays at or
//! above a time-scaled threshold:
//!
//! ```text
//! threshold_i = min(cap, target_rate * max(1, time[i] - time[i-1]))
//! ```
//!
//! The target rate is a per-second slope, so a block that arrives after a long
//! gap is allowed proportionally more complexity. The cap (usually the
//! dimension's historical maximum) keeps idle gaps from pushing the threshold
//! out of reach.
//!
//! # Scan
//!
//! | state    | value vs threshold | action                    |
//! |----------|--------------------|---------------------------|
//! | `Idle`   | `<`                | stay idle                 |
//! | `Idle`   | `>=`               | open a one-block interval |
//! | `InPeak` | `>`                | extend the open interval  |
//! | `InPeak` | `<=`               | seal it, go idle          |
//!
//! Index 0 only serves as the time reference for index 1. The open interval
//! is held apart from the sealed list and appended when sealed; an interval
//! still open after the last sample is sealed there.

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use feescope_core::dimension::{Dimension, Dimensions};
use feescope_core::error::AnalysisError;
use feescope_core::fixed::{Rate, rate_per_second};
use feescope_core::sample::Sample;
use feescope_core::window::{HeightRange, WindowMargins, trace, window_around};

// ---------------------------------------------------------------------------
// PeakInterval
// ---------------------------------------------------------------------------

/// One episode of sustained above-threshold demand on a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakInterval {
    /// Time of the first block in the run.
    pub start_time: u64,
    /// Time of the last block in the run.
    pub end_time: u64,
    /// Sum of the dimension's value over the run.
    pub cumulated_complexity: u64,
    pub start_height: u64,
    pub end_height: u64,
    #[serde(rename = "peak_width")]
    pub block_count: u64,
    /// Wall-clock span of the run in seconds; at least one once sealed.
    #[serde(rename = "peak_duration")]
    pub elapsed_time: u64,
}

impl PeakInterval {
    fn open(sample: &Sample, value: u64) -> Self {
        Self {
            start_time: sample.time,
            end_time: sample.time,
            cumulated_complexity: value,
            start_height: sample.height,
            end_height: sample.height,
            block_count: 1,
            elapsed_time: 0,
        }
    }

    fn extend(&mut self, sample: &Sample, value: u64) {
        self.end_time = sample.time;
        self.end_height = sample.height;
        self.cumulated_complexity = self.cumulated_complexity.saturating_add(value);
        self.block_count += 1;
        self.elapsed_time = sample.time.saturating_sub(self.start_time);
    }

    fn seal(mut self) -> Self {
        self.elapsed_time = self.end_time.saturating_sub(self.start_time).max(1);
        self
    }

    /// Cumulated complexity per second of elapsed time.
    pub fn power(&self) -> Rate {
        rate_per_second(self.cumulated_complexity, self.elapsed_time)
    }

    /// Strength ordering: `Greater` means `self` is the stronger peak.
    ///
    /// Larger cumulated complexity wins; equal totals go to the higher power
    /// (compared exactly by cross-multiplication); remaining ties go to the
    /// earlier peak.
    pub fn cmp_strength(&self, other: &Self) -> Ordering {
        self.cumulated_complexity
            .cmp(&other.cumulated_complexity)
            .then_with(|| {
                let lhs = self.cumulated_complexity as u128 * other.elapsed_time.max(1) as u128;
                let rhs = other.cumulated_complexity as u128 * self.elapsed_time.max(1) as u128;
                lhs.cmp(&rhs)
            })
            .then_with(|| other.start_height.cmp(&self.start_height))
    }

    /// Heights to replay around this peak.
    pub fn window(&self, margins: WindowMargins) -> HeightRange {
        window_around(self.start_height, self.block_count, margins)
    }
}

// ---------------------------------------------------------------------------
// Single-dimension detection
// ---------------------------------------------------------------------------

/// Threshold for a block arriving `dt` seconds after its predecessor.
#[inline]
pub fn threshold(cap: u64, target_rate: u64, dt: u64) -> u64 {
    cap.min(target_rate.saturating_mul(dt.max(1)))
}

/// Threshold at every sample index, for charting against the trace.
///
/// Index 0 has no predecessor and reuses the threshold of index 1.
pub fn threshold_trace(samples: &[Sample], cap: u64, target_rate: u64) -> Vec<u64> {
    let mut out: Vec<u64> = samples
        .windows(2)
        .map(|pair| threshold(cap, target_rate, pair[1].time.saturating_sub(pair[0].time)))
        .collect();
    if let Some(&first) = out.first() {
        out.insert(0, first);
    } else if !samples.is_empty() {
        out.push(threshold(cap, target_rate, 1));
    }
    out
}

enum ScanState {
    Idle,
    InPeak(PeakInterval),
}

/// Extract peak intervals in discovery order.
///
/// `trace[i]` is the dimension value of `samples[i]`.
pub fn scan_peaks(
    samples: &[Sample],
    trace: &[u64],
    cap: u64,
    target_rate: u64,
) -> Result<Vec<PeakInterval>, AnalysisError> {
    if samples.len() != trace.len() {
        return Err(AnalysisError::LengthMismatch {
            samples: samples.len(),
            trace: trace.len(),
        });
    }

    let mut sealed = Vec::new();
    let mut state = ScanState::Idle;

    for (pair, &value) in samples.windows(2).zip(trace.iter().skip(1)) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let limit = threshold(cap, target_rate, cur.time.saturating_sub(prev.time));
        state = match state {
            ScanState::Idle if value >= limit => ScanState::InPeak(PeakInterval::open(cur, value)),
            ScanState::Idle => ScanState::Idle,
            ScanState::InPeak(mut peak) if value > limit => {
                peak.extend(cur, value);
                ScanState::InPeak(peak)
            }
            ScanState::InPeak(peak) => {
                sealed.push(peak.seal());
                ScanState::Idle
            }
        };
    }

    if let ScanState::InPeak(peak) = state {
        sealed.push(peak.seal());
    }
    Ok(sealed)
}

/// Extract peak intervals, strongest first (see [`PeakInterval::cmp_strength`]).
pub fn find_peaks(
    samples: &[Sample],
    trace: &[u64],
    cap: u64,
    target_rate: u64,
) -> Result<Vec<PeakInterval>, AnalysisError> {
    let mut peaks = scan_peaks(samples, trace, cap, target_rate)?;
    peaks.sort_by(|a, b| b.cmp_strength(a));
    Ok(peaks)
}

// ---------------------------------------------------------------------------
// Multi-dimension ranking
// ---------------------------------------------------------------------------

/// Ranked peaks for every dimension, strongest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionPeaks {
    pub bandwidth: Vec<PeakInterval>,
    pub db_read: Vec<PeakInterval>,
    pub db_write: Vec<PeakInterval>,
    pub compute: Vec<PeakInterval>,
}

impl DimensionPeaks {
    /// Iterate `(dimension, peaks)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &[PeakInterval])> + '_ {
        Dimension::ALL.into_iter().map(move |d| (d, self[d].as_slice()))
    }
}

impl Index<Dimension> for DimensionPeaks {
    type Output = Vec<PeakInterval>;

    fn index(&self, dimension: Dimension) -> &Vec<PeakInterval> {
        match dimension {
            Dimension::Bandwidth => &self.bandwidth,
            Dimension::DbRead => &self.db_read,
            Dimension::DbWrite => &self.db_write,
            Dimension::Compute => &self.compute,
        }
    }
}

impl IndexMut<Dimension> for DimensionPeaks {
    fn index_mut(&mut self, dimension: Dimension) -> &mut Vec<PeakInterval> {
        match dimension {
            Dimension::Bandwidth => &mut self.bandwidth,
            Dimension::DbRead => &mut self.db_read,
            Dimension::DbWrite => &mut self.db_write,
            Dimension::Compute => &mut self.compute,
        }
    }
}

fn top_peaks(
    samples: &[Sample],
    dimension: Dimension,
    caps: &Dimensions,
    target_rates: &Dimensions,
    top_k: usize,
) -> Result<Vec<PeakInterval>, AnalysisError> {
    let values = trace(samples, dimension);
    let mut peaks = find_peaks(samples, &values, caps[dimension], target_rates[dimension])?;
    let found = peaks.len();
    peaks.truncate(top_k);
    if found == 0 {
        warn!(%dimension, "no peaks found");
    } else {
        debug!(%dimension, found, kept = peaks.len(), "ranked peaks");
    }
    Ok(peaks)
}

/// Detect peaks on every dimension and keep the `top_k` strongest of each.
///
/// Each dimension is scanned with its own cap and target rate. Dimensions
/// share nothing, so with the `parallel` feature they are scanned
/// concurrently; the result is identical either way.
pub fn rank_all(
    samples: &[Sample],
    caps: &Dimensions,
    target_rates: &Dimensions,
    top_k: usize,
) -> Result<DimensionPeaks, AnalysisError> {
    #[cfg(feature = "parallel")]
    let ranked: Vec<Vec<PeakInterval>> = {
        use rayon::prelude::*;
        Dimension::ALL
            .par_iter()
            .map(|&d| top_peaks(samples, d, caps, target_rates, top_k))
            .collect::<Result<_, _>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let ranked: Vec<Vec<PeakInterval>> = Dimension::ALL
        .iter()
        .map(|&d| top_peaks(samples, d, caps, target_rates, top_k))
        .collect::<Result<_, _>>()?;

    let mut out = DimensionPeaks::default();
    for (d, peaks) in Dimension::ALL.into_iter().zip(ranked) {
        out[d] = peaks;
    }
    Ok(out)
}

// ===========================================================================
// Tests
// ===========================================================================
