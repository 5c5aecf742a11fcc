//! Feescope Data -- block-record ingestion and analysis configuration.
//!
//! - [`records`] parses the 7-column block CSV into a validated
//!   [`feescope_core::sample::RecordStore`].
//! - [`config`] holds [`AnalysisConfig`], loaded from RON, TOML or JSON by
//!   [`loader::deserialize_file`].

pub mod config;
pub mod loader;
pub mod records;

pub use config::AnalysisConfig;
pub use loader::{DataLoadError, Format, deserialize_file, detect_format, load_config};
pub use records::{load_records, parse_records};
