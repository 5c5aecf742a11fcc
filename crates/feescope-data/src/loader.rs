//! File loading: format detection, deserialization and the data error type.
//!
//! Configuration files may be RON, TOML or JSON; the format is chosen from
//! the file extension.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use feescope_core::error::AnalysisError;
use feescope_core::policy::PolicyError;

use crate::config::AnalysisConfig;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading records or configuration.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A CSV row could not be turned into a sample.
    #[error("row {row}, field {field}: {reason}")]
    Row {
        row: usize,
        field: &'static str,
        reason: String,
    },

    /// Parsed records violate the record store invariants.
    #[error(transparent)]
    Records(#[from] AnalysisError),

    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The pricing section of a configuration is invalid.
    #[error("invalid pricing configuration: {0}")]
    Pricing(#[from] PolicyError),

    /// An I/O error occurred.
    #[error("cannot read {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a whole file, keeping its path in the error.
pub(crate) fn read_file(path: &Path) -> Result<String, DataLoadError> {
    std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        file: path.to_path_buf(),
        source,
    })
}

/// Deserialize `content` in the given format.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = read_file(path)?;
    deserialize_str(&content, format, path)
}

/// Load and validate an [`AnalysisConfig`].
///
/// A relative `input` or `output_dir` is resolved against the directory
/// holding the config file.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, DataLoadError> {
    let mut config: AnalysisConfig = deserialize_file(path)?;
    if let Some(base) = path.parent() {
        config.input = base.join(&config.input);
        config.output_dir = base.join(&config.output_dir);
    }
    config.validate()?;
    debug!(
        file = %path.display(),
        input = %config.input.display(),
        policy = config.pricing.name(),
        "loaded analysis config"
    );
    Ok(config)
}

// ===========================================================================
// Tests
// ===========================================================================
