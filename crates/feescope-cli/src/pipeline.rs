//! The end-to-end analysis: load, estimate, rank, select, replay.

use serde::Serialize;
use tracing::info;

use feescope_core::dimension::{Dimension, Dimensions};
use feescope_core::error::AnalysisError;
use feescope_core::replay::{FeeSample, max_fee};
use feescope_core::sample::{RecordStore, Sample};
use feescope_core::window::{HeightRange, filter_by_height};
use feescope_data::{AnalysisConfig, DataLoadError, load_records};
use feescope_pricing::{PricingError, replay_configured};
use feescope_stats::peaks::threshold_trace;
use feescope_stats::{DimensionPeaks, PeakInterval, RateStatistics, estimate, rank_all};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The stage that stopped an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("loading records: {0}")]
    Data(#[from] DataLoadError),

    #[error("analyzing records: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("replaying fees: {0}")]
    Pricing(#[from] PricingError),

    #[error("no {dimension} peak at rank {rank}: only {found} found")]
    PeakNotFound {
        dimension: Dimension,
        rank: usize,
        found: usize,
    },

    #[error("no blocks in replay window {}..={}", window.low, window.high)]
    EmptyWindow { window: HeightRange },
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything one analysis run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub stats: RateStatistics,
    pub max_complexity: Dimensions,
    pub peaks: DimensionPeaks,
    pub dimension: Dimension,
    /// The peak whose surroundings were replayed.
    pub selected: PeakInterval,
    pub window: HeightRange,
    /// Blocks inside `window`, in height order.
    pub window_samples: Vec<Sample>,
    /// Threshold of `dimension` at every window block.
    pub window_targets: Vec<u64>,
    /// One replayed fee per window block.
    pub fees: Vec<FeeSample>,
    pub max_fee: u64,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Load `config.input` and analyze it.
pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport, PipelineError> {
    let store = load_records(&config.input)?;
    analyze(&store, config)
}

/// Analyze an already loaded history.
pub fn analyze(
    store: &RecordStore,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, PipelineError> {
    let samples = store.samples();

    let stats = estimate(samples, config.min_height, config.quantile)?;
    info!(
        median_time_step = stats.median_time_step,
        target_rates = %stats.target_rates,
        "estimated target rates"
    );

    let max_complexity = store.max_complexity();
    info!(%max_complexity, "computed historical maxima");

    let peaks = rank_all(samples, &max_complexity, &stats.target_rates, config.top_k)?;
    let candidates = &peaks[config.dimension];
    let selected = config
        .peak_rank
        .checked_sub(1)
        .and_then(|i| candidates.get(i))
        .copied()
        .ok_or(PipelineError::PeakNotFound {
            dimension: config.dimension,
            rank: config.peak_rank,
            found: candidates.len(),
        })?;

    let window = selected.window(config.margins());
    let window_samples = filter_by_height(samples, window);
    if window_samples.is_empty() {
        return Err(PipelineError::EmptyWindow { window });
    }
    info!(
        dimension = %config.dimension,
        rank = config.peak_rank,
        start_height = selected.start_height,
        block_count = selected.block_count,
        low = window.low,
        high = window.high,
        blocks = window_samples.len(),
        "selected replay window"
    );

    let fees = replay_configured(
        &config.pricing,
        &window_samples,
        &stats.target_rates,
        &max_complexity,
    )?;
    let max_fee = max_fee(&fees).unwrap_or(0);
    info!(max_fee, "fee replay complete");

    let window_targets = threshold_trace(
        &window_samples,
        max_complexity[config.dimension],
        stats.target_rates[config.dimension],
    );

    Ok(AnalysisReport {
        stats,
        max_complexity,
        peaks,
        dimension: config.dimension,
        selected,
        window,
        window_samples,
        window_targets,
        fees,
        max_fee,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
