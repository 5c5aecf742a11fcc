//! Fee replay: fold a pricing policy over a window of historical blocks.
//!
//! The replay is a strict first-order recurrence. Block `i + 1` is charged
//! from the state left by block `i` and the time elapsed between them; no
//! block is skipped, reordered, or computed ahead of its parent.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dimension::Dimensions;
use crate::policy::{PolicyError, PricingPolicy, fee_to_units};
use crate::sample::Sample;

// ---------------------------------------------------------------------------
// FeeSample
// ---------------------------------------------------------------------------

/// The pricing outcome for one replayed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSample {
    pub height: u64,
    pub time: u64,
    /// Rates in effect when the block was charged.
    pub rates: Dimensions,
    /// Realized fee in nano-units.
    pub fee: u64,
}

impl FeeSample {
    /// Realized fee in whole units.
    pub fn fee_units(&self) -> f64 {
        fee_to_units(self.fee)
    }
}

// ---------------------------------------------------------------------------
// ReplayError
// ---------------------------------------------------------------------------

/// A policy failure, located at the block that triggered it.
///
/// State after a failed step is undefined, so the replay stops here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{policy} failed at sample {index} (height {height}): {source}")]
pub struct ReplayError {
    pub policy: &'static str,
    pub index: usize,
    pub height: u64,
    #[source]
    pub source: PolicyError,
}

// ---------------------------------------------------------------------------
// Replay execution
// ---------------------------------------------------------------------------

/// Quote and absorb one block, returning the next state and its fee sample.
fn charge<P: PricingPolicy>(
    policy: &P,
    state: &P::State,
    index: usize,
    sample: &Sample,
) -> Result<(P::State, FeeSample), ReplayError> {
    let located = |source| ReplayError {
        policy: policy.name(),
        index,
        height: sample.height,
        source,
    };
    let fee = policy.quote_fee(state, &sample.complexity).map_err(located)?;
    let next = policy.absorb(state, &sample.complexity).map_err(located)?;
    let out = FeeSample {
        height: sample.height,
        time: sample.time,
        rates: policy.rates(state),
        fee,
    };
    Ok((next, out))
}

/// Replay `policy` over `samples`, one [`FeeSample`] per input, in order.
///
/// Elapsed time between consecutive blocks is `current.time - parent.time`,
/// saturating at zero: blocks sharing a timestamp are charged with no decay.
pub fn replay<P: PricingPolicy>(
    samples: &[Sample],
    policy: &P,
) -> Result<Vec<FeeSample>, ReplayError> {
    let Some(first) = samples.first() else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(samples.len());
    let initial = policy.initialize().map_err(|source| ReplayError {
        policy: policy.name(),
        index: 0,
        height: first.height,
        source,
    })?;
    let (mut state, fee_sample) = charge(policy, &initial, 0, first)?;
    out.push(fee_sample);

    for (offset, pair) in samples.windows(2).enumerate() {
        let index = offset + 1;
        let (parent, current) = (&pair[0], &pair[1]);
        let elapsed = current.time.saturating_sub(parent.time);
        let advanced = policy
            .advance(&state, elapsed)
            .map_err(|source| ReplayError {
                policy: policy.name(),
                index,
                height: current.height,
                source,
            })?;
        let (next, fee_sample) = charge(policy, &advanced, index, current)?;
        out.push(fee_sample);
        state = next;
    }

    debug!(
        policy = policy.name(),
        blocks = out.len(),
        max_fee = max_fee(&out).unwrap_or(0),
        "fee replay finished"
    );
    Ok(out)
}

/// Highest realized fee in a replay, if any.
pub fn max_fee(samples: &[FeeSample]) -> Option<u64> {
    samples.iter().map(|s| s.fee).max()
}

// ===========================================================================
// Tests
// ===========================================================================
