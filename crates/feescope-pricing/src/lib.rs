//! Versioned congestion-pricing policies for the fee replay.
//!
//! Every policy implements [`feescope_core::policy::PricingPolicy`] and keeps
//! all of its state in an explicit value, so the replay driver can fold it over
//! a block history without knowing which rule it is running.
//!
//! # Policies
//!
//! - [`StaticPolicy`] -- constant per-dimension rates; the no-congestion
//!   baseline.
//! - [`MultiDimensionalPolicy`] -- one excess accumulator and one
//!   exponentially adjusted rate per dimension.
//! - [`ExcessGasPolicy`] -- dimensions collapsed into weighted gas, one
//!   exponentially adjusted gas price.
//!
//! Both adaptive policies price with [`fake_exponential`]: the rate is
//! `minimum * e^(excess / denominator)`, where excess grows by each block's
//! demand and leaks at the target rate for every elapsed second.
//!
//! [`PolicyConfig`] selects and configures one of them from a config file;
//! [`replay_configured`] builds the policy and runs the replay.

pub mod config;
pub mod excess_gas;
pub mod exponential;
pub mod multi_dimensional;
pub mod static_rates;

pub use config::{PolicyConfig, PricingError, replay_configured};
pub use excess_gas::{ExcessGasConfig, ExcessGasPolicy, ExcessGasState};
pub use exponential::fake_exponential;
pub use multi_dimensional::{MultiDimensionalConfig, MultiDimensionalPolicy, MultiDimensionalState};
pub use static_rates::{StaticConfig, StaticPolicy};
