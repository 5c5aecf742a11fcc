//! Constant per-dimension rates, independent of demand.

use serde::{Deserialize, Serialize};

use feescope_core::dimension::Dimensions;
use feescope_core::policy::{PolicyError, PricingPolicy};

/// Configuration for [`StaticPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticConfig {
    /// Fee per unit of complexity, per dimension, in nano-units.
    pub rates: Dimensions,
}

/// Baseline policy: the fee is `dot(rates, demand)` regardless of history.
#[derive(Debug, Clone)]
pub struct StaticPolicy {
    rates: Dimensions,
}

impl StaticPolicy {
    pub fn new(config: &StaticConfig) -> Self {
        Self {
            rates: config.rates,
        }
    }
}

impl PricingPolicy for StaticPolicy {
    type State = ();

    fn name(&self) -> &'static str {
        "static"
    }

    fn initialize(&self) -> Result<(), PolicyError> {
        Ok(())
    }

    fn advance(&self, _parent: &(), _elapsed: u64) -> Result<(), PolicyError> {
        Ok(())
    }

    fn quote_fee(&self, _state: &(), demand: &Dimensions) -> Result<u64, PolicyError> {
        demand
            .checked_dot(&self.rates)
            .ok_or(PolicyError::overflow("quoting static fee"))
    }

    fn absorb(&self, _state: &(), _demand: &Dimensions) -> Result<(), PolicyError> {
        Ok(())
    }

    fn rates(&self, _state: &()) -> Dimensions {
        self.rates
    }
}
