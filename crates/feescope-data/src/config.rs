//! Analysis configuration: where the records are, how to rank peaks, which
//! peak to replay, and which pricing policy to replay over it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use feescope_core::dimension::Dimension;
use feescope_core::window::WindowMargins;
use feescope_pricing::PolicyConfig;

use crate::loader::DataLoadError;

/// First height with multi-dimensional complexity accounting on the analyzed
/// chain. Earlier blocks carry no meaningful complexity.
pub const DEFAULT_MIN_HEIGHT: u64 = 2_723_845;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Block record CSV.
    pub input: PathBuf,
    /// Directory receiving `peaks.json`, `complexity.csv` and `fees.csv`.
    pub output_dir: PathBuf,
    /// Blocks below this height are ignored by the rate estimate.
    pub min_height: u64,
    /// Quantile of per-second complexity taken as the target rate.
    pub quantile: f64,
    /// Peaks kept per dimension.
    pub top_k: usize,
    /// Dimension whose peak is replayed.
    pub dimension: Dimension,
    /// 1-based rank of the replayed peak, strongest first.
    pub peak_rank: usize,
    /// Blocks added before the peak window.
    pub margin_low: u64,
    /// Blocks added after the peak window.
    pub margin_high: u64,
    pub pricing: PolicyConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("blocks.csv"),
            output_dir: PathBuf::from("out"),
            min_height: DEFAULT_MIN_HEIGHT,
            quantile: 0.99,
            top_k: 10,
            dimension: Dimension::Bandwidth,
            peak_rank: 2,
            margin_low: 5,
            margin_high: 0,
            pricing: PolicyConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Config for `input` with every other setting at its default.
    pub fn for_input(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn margins(&self) -> WindowMargins {
        WindowMargins {
            low: self.margin_low,
            high: self.margin_high,
        }
    }

    pub fn validate(&self) -> Result<(), DataLoadError> {
        if !(self.quantile > 0.0 && self.quantile <= 1.0) {
            return Err(DataLoadError::InvalidConfig {
                reason: format!("quantile {} is outside (0, 1]", self.quantile),
            });
        }
        if self.top_k == 0 {
            return Err(DataLoadError::InvalidConfig {
                reason: "top_k must be at least 1".into(),
            });
        }
        if self.peak_rank == 0 || self.peak_rank > self.top_k {
            return Err(DataLoadError::InvalidConfig {
                reason: format!(
                    "peak_rank {} must be between 1 and top_k ({})",
                    self.peak_rank, self.top_k
                ),
            });
        }
        self.pricing.validate()?;
        Ok(())
    }
}
