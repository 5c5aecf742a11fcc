#![no_main]
use arbitrary::Arbitrary;
use feescope_core::dimension::Dimension;
use feescope_core::sample::Sample;
use feescope_core::window::trace;
use feescope_stats::find_peaks;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    cap: u64,
    target_rate: u64,
    blocks: Vec<(u8, u32)>,
}

fuzz_target!(|input: Input| {
    // Build an ordered history from (time step, bandwidth) pairs.
    let mut time = 0u64;
    let samples: Vec<Sample> = input
        .blocks
        .iter()
        .enumerate()
        .map(|(i, &(dt, value))| {
            time += u64::from(dt);
            Sample::new(i as u64 + 1, time, [u64::from(value), 0, 0, 0])
        })
        .collect();
    let values = trace(&samples, Dimension::Bandwidth);

    let Ok(peaks) = find_peaks(&samples, &values, input.cap, input.target_rate) else {
        return;
    };
    for pair in peaks.windows(2) {
        assert!(pair[0].cmp_strength(&pair[1]).is_ge());
    }
    for peak in &peaks {
        assert!(peak.block_count >= 1);
        assert!(peak.start_height <= peak.end_height);
    }
});
