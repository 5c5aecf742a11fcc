//! The pricing-policy seam consumed by the fee replay driver.
//!
//! A policy turns demand history into per-dimension rates and a per-block
//! fee. Its state is an explicit value threaded through the replay: each
//! call receives the parent state and returns a fresh one, so a policy never
//! hides mutable state between blocks.
//!
//! One block is charged in three steps:
//!
//! 1. [`PricingPolicy::advance`] the parent state over the elapsed time
//!    (leak accumulated excess, recompute rates),
//! 2. [`PricingPolicy::quote_fee`] the block's demand at those rates,
//! 3. [`PricingPolicy::absorb`] the demand into the state for the next block.

use std::fmt::Debug;

use crate::dimension::Dimensions;

/// Fee units per whole token.
pub const NANO_PER_UNIT: u64 = 1_000_000_000;

/// Convert a fee in nano-units to whole units. Use only for display.
#[inline]
pub fn fee_to_units(fee: u64) -> f64 {
    fee as f64 / NANO_PER_UNIT as f64
}

// ---------------------------------------------------------------------------
// PolicyError
// ---------------------------------------------------------------------------

/// Failures reported by a pricing policy.
///
/// Policies never clamp silently: a value that cannot be represented is an
/// error, and the replay that hit it stops.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("arithmetic overflow while {context}")]
    Overflow { context: &'static str },

    #[error("invalid pricing configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("{resource} demand {demand} exceeds available capacity {capacity}")]
    CapacityExceeded {
        resource: &'static str,
        demand: u64,
        capacity: u64,
    },
}

impl PolicyError {
    pub fn overflow(context: &'static str) -> Self {
        Self::Overflow { context }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PricingPolicy
// ---------------------------------------------------------------------------

/// A deterministic congestion-pricing rule.
///
/// Implementations must be pure functions of their configuration and inputs.
pub trait PricingPolicy {
    /// Carried recurrence state (rates, accumulated excess, ...).
    type State: Clone + Debug;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Starting state, before any block has been seen.
    fn initialize(&self) -> Result<Self::State, PolicyError>;

    /// State after `elapsed` seconds have passed since the parent block.
    fn advance(&self, parent: &Self::State, elapsed: u64) -> Result<Self::State, PolicyError>;

    /// Fee charged for `demand` at the rates of `state`, in nano-units.
    fn quote_fee(&self, state: &Self::State, demand: &Dimensions) -> Result<u64, PolicyError>;

    /// State after the block carrying `demand` has been included.
    fn absorb(&self, state: &Self::State, demand: &Dimensions) -> Result<Self::State, PolicyError>;

    /// Per-dimension rates currently in effect.
    fn rates(&self, state: &Self::State) -> Dimensions;
}
