//! Input and precondition errors shared by the analysis stages.

/// Errors raised while validating input or checking stage preconditions.
///
/// Every variant is fatal to the run: none of them describes a transient
/// condition, so callers propagate instead of retrying.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// A record violates the store invariants (ordering, arity, values).
    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// A per-sample trace does not line up with its samples.
    #[error("trace has {trace} values but there are {samples} samples")]
    LengthMismatch { samples: usize, trace: usize },

    /// Too few samples survived filtering to compute a derivative.
    #[error("need at least {needed} qualifying samples, found {found}")]
    InsufficientSamples { needed: usize, found: usize },

    /// Quantile outside `(0, 1]`.
    #[error("quantile {0} is outside (0, 1]")]
    InvalidQuantile(f64),

    /// A stage that needs at least one sample received none.
    #[error("no samples to {0}")]
    EmptyInput(&'static str),
}
