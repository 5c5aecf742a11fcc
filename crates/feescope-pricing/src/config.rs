//! Policy selection from configuration files.

use serde::{Deserialize, Serialize};
use tracing::info;

use feescope_core::dimension::Dimensions;
use feescope_core::policy::PolicyError;
use feescope_core::replay::{FeeSample, ReplayError, replay};
use feescope_core::sample::Sample;

use crate::excess_gas::{ExcessGasConfig, ExcessGasPolicy};
use crate::multi_dimensional::{MultiDimensionalConfig, MultiDimensionalPolicy};
use crate::static_rates::{StaticConfig, StaticPolicy};

/// Which pricing rule to replay, and its parameters.
///
/// Serialized with a `policy` tag:
///
/// ```toml
/// [pricing]
/// policy = "excess_gas"
/// min_gas_price = 10
/// weights = [6, 10, 10, 1]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PolicyConfig {
    Static(StaticConfig),
    MultiDimensional(MultiDimensionalConfig),
    ExcessGas(ExcessGasConfig),
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::ExcessGas(ExcessGasConfig::default())
    }
}

impl PolicyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Static(_) => "static",
            Self::MultiDimensional(_) => "multi_dimensional",
            Self::ExcessGas(_) => "excess_gas",
        }
    }

    /// Check settings that do not depend on the analyzed history.
    pub fn validate(&self) -> Result<(), PolicyError> {
        match self {
            Self::Static(_) => Ok(()),
            Self::MultiDimensional(config) => {
                // Targets may still be filled in from the estimate.
                let resolved = MultiDimensionalConfig {
                    target_rates: Some(config.target_rates.unwrap_or_default()),
                    ..config.clone()
                };
                resolved.validate()
            }
            Self::ExcessGas(config) => config.validate(),
        }
    }

    /// Fill history-dependent settings left unset in the file.
    pub fn resolve(&self, target_rates: &Dimensions, max_complexity: &Dimensions) -> Self {
        match self {
            Self::MultiDimensional(config) => Self::MultiDimensional(MultiDimensionalConfig {
                target_rates: config.target_rates.or(Some(*target_rates)),
                block_limits: config.block_limits.or(Some(*max_complexity)),
                ..config.clone()
            }),
            other => other.clone(),
        }
    }
}

/// Failure to build or run a configured policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("{policy} policy: {source}")]
    Config {
        policy: &'static str,
        #[source]
        source: PolicyError,
    },

    #[error(transparent)]
    Replay(#[from] ReplayError),
}

/// Build the policy described by `config` and replay it over `samples`.
///
/// `target_rates` and `max_complexity` fill any settings the config leaves
/// to the analyzed history.
pub fn replay_configured(
    config: &PolicyConfig,
    samples: &[Sample],
    target_rates: &Dimensions,
    max_complexity: &Dimensions,
) -> Result<Vec<FeeSample>, PricingError> {
    let resolved = config.resolve(target_rates, max_complexity);
    let config_error = |source| PricingError::Config {
        policy: resolved.name(),
        source,
    };

    info!(policy = resolved.name(), blocks = samples.len(), "replaying fees");
    let fees = match &resolved {
        PolicyConfig::Static(c) => replay(samples, &StaticPolicy::new(c))?,
        PolicyConfig::MultiDimensional(c) => {
            let policy = MultiDimensionalPolicy::new(c).map_err(config_error)?;
            replay(samples, &policy)?
        }
        PolicyConfig::ExcessGas(c) => {
            let policy = ExcessGasPolicy::new(c.clone()).map_err(config_error)?;
            replay(samples, &policy)?
        }
    };
    Ok(fees)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use feescope_core::test_utils::*;

    #[test]
    fn default_is_excess_gas() {
        assert!(matches!(PolicyConfig::default(), PolicyConfig::ExcessGas(_)));
        assert_eq!(PolicyConfig::default().name(), "excess_gas");
    }

    #[test]
    fn deserializes_tagged_toml() {
        let config: PolicyConfig = toml::from_str(
            r#"
            policy = "excess_gas"
            min_gas_price = 20
            weights = [1, 2, 3, 4]
            "#,
        )
        .unwrap();
        let PolicyConfig::ExcessGas(c) = config else {
            panic!("expected excess gas config");
        };
        assert_eq!(c.min_gas_price, 20);
        assert_eq!(c.weights, Dimensions::new([1, 2, 3, 4]));
        assert_eq!(c.update_denominator, 100_000);
    }

    #[test]
    fn deserializes_tagged_json() {
        let config: PolicyConfig =
            serde_json::from_str(r#"{"policy": "static", "rates": [1, 1, 1, 1]}"#).unwrap();
        assert_eq!(
            config,
            PolicyConfig::Static(StaticConfig {
                rates: Dimensions::splat(1)
            })
        );
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(serde_json::from_str::<PolicyConfig>(r#"{"policy": "auction"}"#).is_err());
    }

    #[test]
    fn multi_dimensional_fills_targets_from_history() {
        let config = PolicyConfig::MultiDimensional(MultiDimensionalConfig::default());
        assert!(config.validate().is_ok());
        let resolved = config.resolve(&Dimensions::splat(7), &Dimensions::splat(99));
        let PolicyConfig::MultiDimensional(c) = resolved else {
            panic!("policy kind changed");
        };
        assert_eq!(c.target_rates, Some(Dimensions::splat(7)));
        assert_eq!(c.block_limits, Some(Dimensions::splat(99)));
    }

    #[test]
    fn explicit_targets_are_kept() {
        let config = PolicyConfig::MultiDimensional(MultiDimensionalConfig {
            target_rates: Some(Dimensions::splat(3)),
            ..MultiDimensionalConfig::default()
        });
        let PolicyConfig::MultiDimensional(c) =
            config.resolve(&Dimensions::splat(7), &Dimensions::splat(99))
        else {
            panic!("policy kind changed");
        };
        assert_eq!(c.target_rates, Some(Dimensions::splat(3)));
    }

    #[test]
    fn replays_every_block() {
        let samples = bandwidth_series(&[100, 200, 300, 0]);
        for config in [
            PolicyConfig::Static(StaticConfig {
                rates: Dimensions::splat(2),
            }),
            PolicyConfig::MultiDimensional(MultiDimensionalConfig::default()),
            PolicyConfig::default(),
        ] {
            let fees = replay_configured(
                &config,
                &samples,
                &Dimensions::splat(100),
                &Dimensions::splat(300),
            )
            .unwrap();
            assert_eq!(fees.len(), samples.len());
            assert_eq!(fees[3].fee, 0);
        }
    }

    #[test]
    fn invalid_config_names_policy() {
        let config = PolicyConfig::ExcessGas(ExcessGasConfig {
            update_denominator: 0,
            ..ExcessGasConfig::default()
        });
        assert!(config.validate().is_err());
        let err = replay_configured(
            &config,
            &bandwidth_series(&[1]),
            &Dimensions::EMPTY,
            &Dimensions::EMPTY,
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::Config { policy: "excess_gas", .. }));
    }
}
