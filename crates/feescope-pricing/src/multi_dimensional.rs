//! One excess accumulator and one exponential rate per dimension.
//!
//! Each dimension is priced on its own: demand adds to that dimension's
//! excess, the excess leaks at the dimension's target rate, and the rate is
//! `min_rate * e^(excess / update_denominator)`. A block's fee is the dot
//! product of its demand with the rates in effect.

use serde::{Deserialize, Serialize};

use feescope_core::dimension::{Dimension, Dimensions};
use feescope_core::policy::{PolicyError, PricingPolicy};

use crate::exponential::fake_exponential;

/// Configuration for [`MultiDimensionalPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiDimensionalConfig {
    /// Rate floor per dimension, in nano-units per unit of complexity.
    pub min_rates: Dimensions,
    /// Sustainable complexity per second. Filled from the rate estimate
    /// when absent.
    pub target_rates: Option<Dimensions>,
    /// Excess per dimension that multiplies its rate by `e`.
    pub update_denominators: Dimensions,
    /// Largest single-block demand per dimension. Filled from the observed
    /// maxima when absent.
    pub block_limits: Option<Dimensions>,
}

impl Default for MultiDimensionalConfig {
    fn default() -> Self {
        Self {
            min_rates: Dimensions::splat(1),
            target_rates: None,
            update_denominators: Dimensions::splat(100_000),
            block_limits: None,
        }
    }
}

impl MultiDimensionalConfig {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.min_rates.is_empty() {
            return Err(PolicyError::invalid("at least one minimum rate must be non-zero"));
        }
        if let Some((d, _)) = self.update_denominators.iter().find(|&(_, v)| v == 0) {
            return Err(PolicyError::invalid(format!(
                "update denominator for {d} must be non-zero"
            )));
        }
        if self.target_rates.is_none() {
            return Err(PolicyError::invalid("target_rates must be set"));
        }
        Ok(())
    }
}

/// Carried state of [`MultiDimensionalPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiDimensionalState {
    pub excess: Dimensions,
    pub rates: Dimensions,
}

#[derive(Debug, Clone)]
pub struct MultiDimensionalPolicy {
    min_rates: Dimensions,
    target_rates: Dimensions,
    update_denominators: Dimensions,
    block_limits: Option<Dimensions>,
}

impl MultiDimensionalPolicy {
    pub fn new(config: &MultiDimensionalConfig) -> Result<Self, PolicyError> {
        config.validate()?;
        let target_rates = config
            .target_rates
            .ok_or_else(|| PolicyError::invalid("target_rates must be set"))?;
        Ok(Self {
            min_rates: config.min_rates,
            target_rates,
            update_denominators: config.update_denominators,
            block_limits: config.block_limits,
        })
    }

    fn rates_for(&self, excess: &Dimensions) -> Result<Dimensions, PolicyError> {
        let mut rates = Dimensions::EMPTY;
        for d in Dimension::ALL {
            rates[d] = fake_exponential(self.min_rates[d], excess[d], self.update_denominators[d])?;
        }
        Ok(rates)
    }
}

impl PricingPolicy for MultiDimensionalPolicy {
    type State = MultiDimensionalState;

    fn name(&self) -> &'static str {
        "multi_dimensional"
    }

    fn initialize(&self) -> Result<MultiDimensionalState, PolicyError> {
        Ok(MultiDimensionalState {
            excess: Dimensions::EMPTY,
            rates: self.min_rates,
        })
    }

    fn advance(
        &self,
        parent: &MultiDimensionalState,
        elapsed: u64,
    ) -> Result<MultiDimensionalState, PolicyError> {
        let mut excess = parent.excess;
        for d in Dimension::ALL {
            let leak = self.target_rates[d]
                .checked_mul(elapsed)
                .ok_or(PolicyError::overflow("leaking per-dimension excess"))?;
            excess[d] = excess[d].saturating_sub(leak);
        }
        Ok(MultiDimensionalState {
            excess,
            rates: self.rates_for(&excess)?,
        })
    }

    fn quote_fee(
        &self,
        state: &MultiDimensionalState,
        demand: &Dimensions,
    ) -> Result<u64, PolicyError> {
        demand
            .checked_dot(&state.rates)
            .ok_or(PolicyError::overflow("quoting multi-dimensional fee"))
    }

    fn absorb(
        &self,
        state: &MultiDimensionalState,
        demand: &Dimensions,
    ) -> Result<MultiDimensionalState, PolicyError> {
        if let Some(limits) = &self.block_limits {
            for (d, value) in demand.iter() {
                if value > limits[d] {
                    return Err(PolicyError::CapacityExceeded {
                        resource: d.name(),
                        demand: value,
                        capacity: limits[d],
                    });
                }
            }
        }
        let mut excess = state.excess;
        for (d, value) in demand.iter() {
            excess[d] = excess[d]
                .checked_add(value)
                .ok_or(PolicyError::overflow("accumulating per-dimension excess"))?;
        }
        Ok(MultiDimensionalState {
            excess,
            rates: state.rates,
        })
    }

    fn rates(&self, state: &MultiDimensionalState) -> Dimensions {
        state.rates
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MultiDimensionalConfig {
        MultiDimensionalConfig {
            min_rates: Dimensions::new([10, 10, 10, 10]),
            target_rates: Some(Dimensions::new([1_000, 1_000, 1_000, 1_000])),
            update_denominators: Dimensions::splat(100_000),
            block_limits: None,
        }
    }

    #[test]
    fn starts_at_min_rates() {
        let p = MultiDimensionalPolicy::new(&config()).unwrap();
        let s = p.initialize().unwrap();
        assert_eq!(p.rates(&s), Dimensions::splat(10));
        assert_eq!(p.quote_fee(&s, &Dimensions::new([1, 2, 3, 4])).unwrap(), 100);
    }

    #[test]
    fn dimensions_move_independently() {
        let p = MultiDimensionalPolicy::new(&config()).unwrap();
        let s = p.initialize().unwrap();
        let s = p.absorb(&s, &Dimensions::new([101_000, 0, 0, 0])).unwrap();
        let s = p.advance(&s, 1).unwrap();
        assert_eq!(s.excess, Dimensions::new([100_000, 0, 0, 0]));
        assert_eq!(s.rates, Dimensions::new([27, 10, 10, 10]));
    }

    #[test]
    fn sustained_overload_keeps_raising_rates() {
        let p = MultiDimensionalPolicy::new(&config()).unwrap();
        let mut s = p.initialize().unwrap();
        let mut last = 0;
        for _ in 0..5 {
            s = p.absorb(&s, &Dimensions::new([0, 0, 51_000, 0])).unwrap();
            s = p.advance(&s, 1).unwrap();
            assert!(s.rates[Dimension::DbWrite] >= last);
            last = s.rates[Dimension::DbWrite];
        }
        assert!(last > 10);
    }

    #[test]
    fn idle_time_returns_to_floor() {
        let p = MultiDimensionalPolicy::new(&config()).unwrap();
        let s = p.absorb(&p.initialize().unwrap(), &Dimensions::splat(50_000)).unwrap();
        let s = p.advance(&s, 60).unwrap();
        assert_eq!(s.excess, Dimensions::EMPTY);
        assert_eq!(s.rates, Dimensions::splat(10));
    }

    #[test]
    fn demand_over_block_limit_is_rejected() {
        let p = MultiDimensionalPolicy::new(&MultiDimensionalConfig {
            block_limits: Some(Dimensions::new([100, 100, 5, 100])),
            ..config()
        })
        .unwrap();
        let s = p.initialize().unwrap();
        assert_eq!(
            p.absorb(&s, &Dimensions::new([1, 1, 6, 1])),
            Err(PolicyError::CapacityExceeded {
                resource: "db_write",
                demand: 6,
                capacity: 5
            })
        );
    }

    #[test]
    fn missing_targets_or_zero_denominator_are_invalid() {
        let no_targets = MultiDimensionalConfig {
            target_rates: None,
            ..config()
        };
        assert!(MultiDimensionalPolicy::new(&no_targets).is_err());

        let zero_denominator = MultiDimensionalConfig {
            update_denominators: Dimensions::new([1, 1, 0, 1]),
            ..config()
        };
        let err = MultiDimensionalPolicy::new(&zero_denominator).unwrap_err();
        assert!(err.to_string().contains("db_write"));
    }

    #[test]
    fn leak_overflow_is_an_error() {
        let p = MultiDimensionalPolicy::new(&MultiDimensionalConfig {
            target_rates: Some(Dimensions::splat(u64::MAX)),
            ..config()
        })
        .unwrap();
        let s = p.initialize().unwrap();
        assert!(matches!(p.advance(&s, 2), Err(PolicyError::Overflow { .. })));
    }
}
