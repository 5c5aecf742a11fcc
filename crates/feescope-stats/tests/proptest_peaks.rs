//! Property-based tests for rate estimation and peak detection.
//!
//! Generates random ordered histories and checks the structural guarantees
//! of the estimator and the detector.

use feescope_core::dimension::{Dimension, Dimensions};
use feescope_core::fixed::rate_to_u64;
use feescope_core::sample::{Sample, max_complexity};
use feescope_core::window::trace;
use feescope_stats::peaks::threshold_trace;
use feescope_stats::rate::derivatives;
use feescope_stats::{estimate, find_peaks, rank_all, scan_peaks};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Ordered history: strictly increasing heights, non-decreasing times.
fn arb_history(max_len: usize) -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec(
        (1u64..3, 0u64..6, prop::array::uniform4(0u64..1_000)),
        2..=max_len,
    )
    .prop_map(|steps| {
        let (mut height, mut time) = (0u64, 1_000u64);
        steps
            .into_iter()
            .map(|(dh, dt, complexity)| {
                height += dh;
                time += dt;
                Sample::new(height, time, complexity)
            })
            .collect()
    })
}

fn bandwidth_peaks(samples: &[Sample], cap: u64, rate: u64) -> Vec<feescope_stats::PeakInterval> {
    let values = trace(samples, Dimension::Bandwidth);
    scan_peaks(samples, &values, cap, rate).unwrap()
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn discovered_peaks_do_not_overlap(samples in arb_history(200), rate in 0u64..500) {
        let cap = max_complexity(&samples)[Dimension::Bandwidth];
        let peaks = bandwidth_peaks(&samples, cap, rate);
        for pair in peaks.windows(2) {
            prop_assert!(pair[0].end_height < pair[1].start_height);
        }
    }

    #[test]
    fn every_peak_is_well_formed(samples in arb_history(200), rate in 0u64..500) {
        let cap = max_complexity(&samples)[Dimension::Bandwidth];
        for peak in bandwidth_peaks(&samples, cap, rate) {
            prop_assert!(peak.block_count >= 1);
            prop_assert!(peak.elapsed_time >= 1);
            prop_assert!(peak.start_height <= peak.end_height);
            prop_assert!(peak.start_time <= peak.end_time);
        }
    }

    #[test]
    fn find_peaks_sorts_strongest_first(samples in arb_history(200), rate in 0u64..500) {
        let cap = max_complexity(&samples)[Dimension::Bandwidth];
        let values = trace(&samples, Dimension::Bandwidth);
        let peaks = find_peaks(&samples, &values, cap, rate).unwrap();
        prop_assert_eq!(peaks.len(), bandwidth_peaks(&samples, cap, rate).len());
        for pair in peaks.windows(2) {
            prop_assert!(pair[0].cmp_strength(&pair[1]).is_gt());
        }
    }

    #[test]
    fn ranking_is_deterministic(samples in arb_history(150), top_k in 1usize..8) {
        let caps = max_complexity(&samples);
        let rates = Dimensions::splat(100);
        let first = rank_all(&samples, &caps, &rates, top_k).unwrap();
        let second = rank_all(&samples, &caps, &rates, top_k).unwrap();
        for (d, peaks) in first.iter() {
            prop_assert!(peaks.len() <= top_k);
            prop_assert_eq!(peaks, second[d].as_slice());
        }
    }

    #[test]
    fn full_quantile_is_maximum_derivative(samples in arb_history(100)) {
        let qualifying: Vec<Sample> =
            samples.iter().filter(|s| !s.complexity.is_empty()).copied().collect();
        prop_assume!(qualifying.len() >= 2);
        let stats = estimate(&samples, 0, 1.0).unwrap();
        let d = derivatives(&qualifying);
        for dim in Dimension::ALL {
            let max = d.rates_of(dim).iter().max().copied().unwrap();
            prop_assert_eq!(stats.target_rates[dim], rate_to_u64(max));
        }
    }

    #[test]
    fn higher_quantile_never_lowers_rate(samples in arb_history(100), q in 0.01f64..0.99) {
        prop_assume!(samples.iter().filter(|s| !s.complexity.is_empty()).count() >= 2);
        let low = estimate(&samples, 0, q).unwrap();
        let high = estimate(&samples, 0, 1.0).unwrap();
        for dim in Dimension::ALL {
            prop_assert!(low.target_rates[dim] <= high.target_rates[dim]);
        }
    }

    #[test]
    fn threshold_never_exceeds_cap(samples in arb_history(100), cap in 0u64..1_000, rate in 0u64..1_000) {
        let limits = threshold_trace(&samples, cap, rate);
        prop_assert_eq!(limits.len(), samples.len());
        prop_assert!(limits.iter().all(|&l| l <= cap));
    }
}
