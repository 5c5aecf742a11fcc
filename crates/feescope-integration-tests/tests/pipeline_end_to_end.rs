//! End-to-end analysis runs: CSV and config on disk, reports on disk.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use feescope_cli::{PipelineError, analyze, run, write_report};
use feescope_core::dimension::{Dimension, Dimensions};
use feescope_core::id::BlockId;
use feescope_core::sample::{RecordStore, Sample};
use feescope_core::test_utils::*;
use feescope_data::{AnalysisConfig, load_config, load_records};
use feescope_pricing::{ExcessGasConfig, MultiDimensionalConfig, PolicyConfig};
use feescope_stats::{estimate, find_peaks, rank_all};

// ===========================================================================
// Fixtures
// ===========================================================================

fn to_csv(samples: &[Sample]) -> String {
    let mut out = String::new();
    for s in samples {
        let c = s.complexity;
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            s.id, s.height, s.time, c.0[0], c.0[1], c.0[2], c.0[3]
        )
        .unwrap();
    }
    out
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Excess-gas pricing damped enough for synthetic bursts of heavy demand.
fn damped_pricing() -> PolicyConfig {
    PolicyConfig::ExcessGas(ExcessGasConfig {
        update_denominator: 1_000_000_000,
        ..ExcessGasConfig::default()
    })
}

/// Tagged synthetic history starting at height 1.
fn history(len: usize) -> Vec<Sample> {
    synthetic_history(len, 7)
        .into_iter()
        .map(|s| {
            let mut bytes = [0u8; 32];
            bytes[..8].copy_from_slice(&s.height.to_be_bytes());
            s.with_id(BlockId::new(bytes))
        })
        .collect()
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn two_block_burst_is_one_peak() {
    let samples = two_block_burst();
    let values: Vec<u64> = samples.iter().map(|s| s.complexity[Dimension::Bandwidth]).collect();
    let peaks = find_peaks(&samples, &values, 100, 5).unwrap();
    assert_eq!(peaks.len(), 1);
    let peak = peaks[0];
    assert_eq!((peak.start_height, peak.end_height), (2, 3));
    assert_eq!(peak.cumulated_complexity, 20);
    assert_eq!(peak.block_count, 2);
    assert_eq!(peak.elapsed_time, 1);
}

#[test]
fn csv_round_trip_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let samples = history(500);
    let path = write(dir.path(), "blocks.csv", &to_csv(&samples));
    let store = load_records(&path).unwrap();
    assert_eq!(store.samples(), samples.as_slice());
}

#[test]
fn full_run_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "blocks.csv", &to_csv(&history(2_000)));
    let config_path = write(
        dir.path(),
        "analysis.toml",
        r#"
        input = "blocks.csv"
        output_dir = "reports"
        min_height = 0
        quantile = 0.9
        top_k = 5
        peak_rank = 2

        [pricing]
        policy = "excess_gas"
        update_denominator = 1_000_000_000
        "#,
    );

    let config = load_config(&config_path).unwrap();
    let report = run(&config).unwrap();
    assert_eq!(report.fees.len(), report.window_samples.len());
    assert!(report.peaks.iter().all(|(_, peaks)| peaks.len() <= 5));
    assert_eq!(report.selected, report.peaks[Dimension::Bandwidth][1]);
    assert_eq!(report.max_fee, report.fees.iter().map(|f| f.fee).max().unwrap());

    let files = write_report(&report, &config.output_dir).unwrap();
    assert_eq!(files.fees, dir.path().join("reports").join("fees.csv"));
    let fees_csv = fs::read_to_string(&files.fees).unwrap();
    assert_eq!(fees_csv.lines().count(), report.fees.len() + 1);
    let peaks: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files.peaks).unwrap()).unwrap();
    assert_eq!(peaks["bandwidth"].as_array().unwrap().len(), report.peaks.bandwidth.len());
}

#[test]
fn run_is_reproducible() {
    let store = RecordStore::new(history(3_000)).unwrap();
    let config = AnalysisConfig {
        min_height: 0,
        peak_rank: 1,
        pricing: damped_pricing(),
        ..AnalysisConfig::default()
    };
    assert_eq!(analyze(&store, &config).unwrap(), analyze(&store, &config).unwrap());
}

#[test]
fn multi_dimensional_policy_uses_estimated_targets() {
    let store = RecordStore::new(history(3_000)).unwrap();
    let config = AnalysisConfig {
        min_height: 0,
        peak_rank: 1,
        pricing: PolicyConfig::MultiDimensional(MultiDimensionalConfig {
            update_denominators: Dimensions::splat(1_000_000_000),
            ..MultiDimensionalConfig::default()
        }),
        ..AnalysisConfig::default()
    };
    let report = analyze(&store, &config).unwrap();
    assert_eq!(report.fees.len(), report.window_samples.len());
    assert!(report.fees.iter().all(|f| f.rates.iter().all(|(_, r)| r >= 1)));
}

#[test]
fn missing_input_names_the_load_stage() {
    let config = AnalysisConfig::for_input("/nonexistent/blocks.csv");
    let err = run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Data(_)));
    assert!(err.to_string().starts_with("loading records"));
}

#[test]
fn ranking_matches_single_dimension_detection() {
    let samples = history(1_000);
    let stats = estimate(&samples, 0, 0.99).unwrap();
    let caps = Dimensions::from_fn(|d| samples.iter().map(|s| s.complexity[d]).max().unwrap());
    let ranked = rank_all(&samples, &caps, &stats.target_rates, usize::MAX).unwrap();
    for d in Dimension::ALL {
        let values: Vec<u64> = samples.iter().map(|s| s.complexity[d]).collect();
        let direct = find_peaks(&samples, &values, caps[d], stats.target_rates[d]).unwrap();
        assert_eq!(ranked[d], direct);
    }
}
