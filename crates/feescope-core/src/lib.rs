//! Feescope Core -- block samples, pricing-policy seam, and the fee replay driver.
//!
//! This crate holds the data model every feescope crate shares and the one
//! stateful computation of the pipeline: replaying a pricing policy over a
//! window of blocks.
//!
//! # Pipeline
//!
//! A full analysis run is a sequential batch computation over an in-memory
//! history:
//!
//! 1. **Load** -- Parse records into a validated [`sample::RecordStore`].
//! 2. **Estimate** -- Derive a robust per-second rate per dimension
//!    (`feescope-stats`).
//! 3. **Detect** -- Scan each dimension against a time-scaled threshold and
//!    rank the peaks (`feescope-stats`).
//! 4. **Select** -- Pick a height window around a peak ([`window`]).
//! 5. **Replay** -- Fold a [`policy::PricingPolicy`] over the window
//!    ([`replay::replay`]).
//!
//! # Key Types
//!
//! - [`dimension::Dimensions`] -- Fixed-arity complexity vector indexed by
//!   [`dimension::Dimension`].
//! - [`sample::Sample`] -- One block: identifier, height, time, complexity.
//! - [`policy::PricingPolicy`] -- Swappable congestion-pricing rule with an
//!   explicit state threaded through the replay.
//! - [`replay::FeeSample`] -- One replayed block: rates and realized fee.
//! - [`fixed::Rate`] -- U64.64 fixed-point type for deterministic rate math.

pub mod dimension;
pub mod error;
pub mod fixed;
pub mod id;
pub mod policy;
pub mod replay;
pub mod sample;
pub mod window;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
