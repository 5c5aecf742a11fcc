//! Single gas price driven by accumulated excess gas.
//!
//! Complexity is collapsed into gas with per-dimension weights. Each block's
//! gas is added to an excess accumulator, which leaks at
//! `gas_target_rate * leak_coeff` per elapsed second. The gas price is
//! `min_gas_price * e^(excess / update_denominator)`, so it sits at the
//! minimum while demand stays at or under target and climbs exponentially
//! during sustained overload.

use serde::{Deserialize, Serialize};

use feescope_core::dimension::Dimensions;
use feescope_core::policy::{PolicyError, PricingPolicy};

use crate::exponential::fake_exponential;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for [`ExcessGasPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcessGasConfig {
    /// Gas price floor in nano-units per gas.
    pub min_gas_price: u64,
    /// Excess gas that multiplies the price by `e`.
    pub update_denominator: u64,
    /// Gas per second the chain is expected to sustain.
    pub gas_target_rate: u64,
    /// Gas per unit of complexity, per dimension.
    pub weights: Dimensions,
    /// Gas per second the chain can absorb at most.
    pub max_gas_per_second: u64,
    /// Multiplier on the target rate when leaking excess.
    pub leak_coeff: u64,
    /// Excess carried into the first block.
    pub initial_excess: u64,
    /// Reject blocks whose gas exceeds `max_gas_per_second` times the
    /// seconds since their parent (one second for the first block).
    pub enforce_capacity: bool,
}

impl Default for ExcessGasConfig {
    fn default() -> Self {
        Self {
            min_gas_price: 10,
            update_denominator: 100_000,
            gas_target_rate: 2_500,
            weights: Dimensions::new([6, 10, 10, 1]),
            max_gas_per_second: 1_000_000,
            leak_coeff: 1,
            initial_excess: 0,
            enforce_capacity: false,
        }
    }
}

impl ExcessGasConfig {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.min_gas_price == 0 {
            return Err(PolicyError::invalid("min_gas_price must be non-zero"));
        }
        if self.update_denominator == 0 {
            return Err(PolicyError::invalid("update_denominator must be non-zero"));
        }
        if self.weights.is_empty() {
            return Err(PolicyError::invalid("at least one gas weight must be non-zero"));
        }
        if self.enforce_capacity && self.max_gas_per_second == 0 {
            return Err(PolicyError::invalid(
                "max_gas_per_second must be non-zero when capacity is enforced",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Carried state of [`ExcessGasPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcessGasState {
    pub excess: u64,
    pub gas_price: u64,
    /// Seconds since the parent block, bounding this block's capacity.
    pub elapsed: u64,
}

#[derive(Debug, Clone)]
pub struct ExcessGasPolicy {
    config: ExcessGasConfig,
}

impl ExcessGasPolicy {
    pub fn new(config: ExcessGasConfig) -> Result<Self, PolicyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExcessGasConfig {
        &self.config
    }

    /// Weighted gas of a block's complexity.
    pub fn gas(&self, demand: &Dimensions) -> Result<u64, PolicyError> {
        demand
            .checked_dot(&self.config.weights)
            .ok_or(PolicyError::overflow("weighting complexity into gas"))
    }

    fn price(&self, excess: u64) -> Result<u64, PolicyError> {
        fake_exponential(self.config.min_gas_price, excess, self.config.update_denominator)
    }
}

impl PricingPolicy for ExcessGasPolicy {
    type State = ExcessGasState;

    fn name(&self) -> &'static str {
        "excess_gas"
    }

    fn initialize(&self) -> Result<ExcessGasState, PolicyError> {
        let excess = self.config.initial_excess;
        Ok(ExcessGasState {
            excess,
            gas_price: self.price(excess)?,
            elapsed: 1,
        })
    }

    fn advance(&self, parent: &ExcessGasState, elapsed: u64) -> Result<ExcessGasState, PolicyError> {
        let leak = self
            .config
            .gas_target_rate
            .checked_mul(self.config.leak_coeff)
            .and_then(|per_second| per_second.checked_mul(elapsed))
            .ok_or(PolicyError::overflow("leaking excess gas"))?;
        let excess = parent.excess.saturating_sub(leak);
        Ok(ExcessGasState {
            excess,
            gas_price: self.price(excess)?,
            elapsed,
        })
    }

    fn quote_fee(&self, state: &ExcessGasState, demand: &Dimensions) -> Result<u64, PolicyError> {
        self.gas(demand)?
            .checked_mul(state.gas_price)
            .ok_or(PolicyError::overflow("multiplying gas by gas price"))
    }

    fn absorb(&self, state: &ExcessGasState, demand: &Dimensions) -> Result<ExcessGasState, PolicyError> {
        let gas = self.gas(demand)?;
        if self.config.enforce_capacity {
            let capacity = self
                .config
                .max_gas_per_second
                .checked_mul(state.elapsed.max(1))
                .ok_or(PolicyError::overflow("computing block gas capacity"))?;
            if gas > capacity {
                return Err(PolicyError::CapacityExceeded {
                    resource: "gas",
                    demand: gas,
                    capacity,
                });
            }
        }
        let excess = state
            .excess
            .checked_add(gas)
            .ok_or(PolicyError::overflow("accumulating excess gas"))?;
        Ok(ExcessGasState { excess, ..*state })
    }

    fn rates(&self, state: &ExcessGasState) -> Dimensions {
        Dimensions::from_fn(|d| self.config.weights[d].saturating_mul(state.gas_price))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
