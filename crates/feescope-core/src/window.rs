//! Height windows and chart-ready series extraction.

use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;
use crate::replay::FeeSample;
use crate::sample::Sample;

// ---------------------------------------------------------------------------
// HeightRange
// ---------------------------------------------------------------------------

/// Inclusive range of block heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightRange {
    pub low: u64,
    pub high: u64,
}

impl HeightRange {
    /// Every height.
    pub const ALL: HeightRange = HeightRange {
        low: 0,
        high: u64::MAX,
    };

    pub const fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    /// All heights at or above `low`.
    pub const fn from_min(low: u64) -> Self {
        Self {
            low,
            high: u64::MAX,
        }
    }

    #[inline]
    pub fn contains(&self, height: u64) -> bool {
        height >= self.low && height <= self.high
    }
}

/// Extra blocks to include before and after a selected peak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowMargins {
    pub low: u64,
    pub high: u64,
}

/// Height window around a run of `block_count` blocks starting at
/// `start_height`.
///
/// The window opens one block after the run's first block, so the run's
/// opening block is only included through `margins.low`, and closes
/// `block_count` blocks later plus `margins.high`.
pub fn window_around(start_height: u64, block_count: u64, margins: WindowMargins) -> HeightRange {
    let first = start_height.saturating_add(1);
    let last = first.saturating_add(block_count);
    HeightRange {
        low: first.saturating_sub(margins.low),
        high: last.saturating_add(margins.high),
    }
}

// ---------------------------------------------------------------------------
// Filtering and series
// ---------------------------------------------------------------------------

/// Samples whose height falls inside `range`, in their original order.
pub fn filter_by_height(samples: &[Sample], range: HeightRange) -> Vec<Sample> {
    samples
        .iter()
        .filter(|s| range.contains(s.height))
        .copied()
        .collect()
}

/// Height of every sample.
pub fn heights(samples: &[Sample]) -> Vec<u64> {
    samples.iter().map(|s| s.height).collect()
}

/// One dimension's value for every sample.
pub fn trace(samples: &[Sample], dimension: Dimension) -> Vec<u64> {
    samples.iter().map(|s| s.complexity[dimension]).collect()
}

/// Realized fees of the replayed blocks inside `range`.
pub fn fees_in_range(fees: &[FeeSample], range: HeightRange) -> Vec<u64> {
    fees.iter()
        .filter(|f| range.contains(f.height))
        .map(|f| f.fee)
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Dimensions;
    use crate::test_utils::*;

    fn ladder() -> Vec<Sample> {
        (1..=10).map(|h| bandwidth_sample(h, h * 2, h * 10)).collect()
    }

    #[test]
    fn range_is_inclusive() {
        let r = HeightRange::new(3, 5);
        assert!(!r.contains(2));
        assert!(r.contains(3));
        assert!(r.contains(5));
        assert!(!r.contains(6));
        assert!(HeightRange::from_min(7).contains(u64::MAX));
    }

    #[test]
    fn window_covers_run_plus_margins() {
        let w = window_around(100, 4, WindowMargins { low: 5, high: 0 });
        assert_eq!(w, HeightRange::new(96, 105));
        let w = window_around(100, 4, WindowMargins { low: 0, high: 2 });
        assert_eq!(w, HeightRange::new(101, 107));
    }

    #[test]
    fn window_saturates_near_zero() {
        let w = window_around(1, 1, WindowMargins { low: 10, high: 0 });
        assert_eq!(w.low, 0);
        assert_eq!(w.high, 3);
    }

    #[test]
    fn filter_keeps_order() {
        let kept = filter_by_height(&ladder(), HeightRange::new(4, 6));
        assert_eq!(heights(&kept), vec![4, 5, 6]);
    }

    #[test]
    fn trace_extracts_one_slot() {
        let samples = vec![
            Sample::new(1, 0, [1, 2, 3, 4]),
            Sample::new(2, 1, [5, 6, 7, 8]),
        ];
        assert_eq!(trace(&samples, Dimension::DbWrite), vec![3, 7]);
        assert_eq!(trace(&samples, Dimension::Bandwidth), vec![1, 5]);
    }

    #[test]
    fn fees_filtered_by_height() {
        let fees: Vec<FeeSample> = (1..=5)
            .map(|h| FeeSample {
                height: h,
                time: h,
                rates: Dimensions::EMPTY,
                fee: h * 100,
            })
            .collect();
        assert_eq!(fees_in_range(&fees, HeightRange::new(2, 3)), vec![200, 300]);
    }
}
