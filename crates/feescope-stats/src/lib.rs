//! Rate estimation and peak detection over a block history.
//!
//! Two stages of the analysis pipeline live here:
//!
//! - [`rate`] turns consecutive-block deltas into a robust per-second rate
//!   per dimension (a quantile of the observed derivatives).
//! - [`peaks`] scans one dimension against a threshold that scales that rate
//!   by the actual time between blocks, extracts the runs of blocks that stay
//!   above it, and ranks them per dimension.
//!
//! # Usage
//!
//! ```ignore
//! let stats = estimate(store.samples(), min_height, 0.99)?;
//! let caps = store.max_complexity();
//! let ranked = rank_all(store.samples(), &caps, &stats.target_rates, 10)?;
//! let strongest = ranked[Dimension::Bandwidth].first();
//! ```

pub mod peaks;
pub mod rate;

pub use peaks::{DimensionPeaks, PeakInterval, find_peaks, rank_all, scan_peaks};
pub use rate::{RateStatistics, estimate};
