//! Block samples and the validated, height-ordered record store.

use serde::{Deserialize, Serialize};

use crate::dimension::Dimensions;
use crate::error::AnalysisError;
use crate::id::BlockId;

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// One historical block: identifier, height, timestamp and complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub id: BlockId,
    pub height: u64,
    /// Block timestamp in seconds.
    pub time: u64,
    pub complexity: Dimensions,
}

impl Sample {
    /// A sample with the empty identifier.
    pub fn new(height: u64, time: u64, complexity: impl Into<Dimensions>) -> Self {
        Self {
            id: BlockId::EMPTY,
            height,
            time,
            complexity: complexity.into(),
        }
    }

    pub fn with_id(mut self, id: BlockId) -> Self {
        self.id = id;
        self
    }
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// The full in-memory history, sorted by height.
///
/// Construction checks that heights are strictly increasing and timestamps
/// never go backwards. Downstream stages borrow the samples as a slice.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    samples: Vec<Sample>,
}

impl RecordStore {
    pub fn new(samples: Vec<Sample>) -> Result<Self, AnalysisError> {
        validate_order(&samples)?;
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Historical per-dimension maximum over the whole store.
    pub fn max_complexity(&self) -> Dimensions {
        max_complexity(&self.samples)
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Check the store invariants, reporting the first offending index.
pub fn validate_order(samples: &[Sample]) -> Result<(), AnalysisError> {
    for (i, pair) in samples.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.height <= prev.height {
            return Err(AnalysisError::InvalidRecord {
                index: i + 1,
                reason: format!(
                    "height {} does not follow previous height {}",
                    cur.height, prev.height
                ),
            });
        }
        if cur.time < prev.time {
            return Err(AnalysisError::InvalidRecord {
                index: i + 1,
                reason: format!(
                    "time {} precedes previous block time {}",
                    cur.time, prev.time
                ),
            });
        }
    }
    Ok(())
}

/// Drop blocks whose complexity is the all-zero vector.
pub fn skip_empty(samples: &[Sample]) -> Vec<Sample> {
    samples
        .iter()
        .filter(|s| !s.complexity.is_empty())
        .copied()
        .collect()
}

/// Slot-wise maximum complexity over `samples` (zero for an empty slice).
pub fn max_complexity(samples: &[Sample]) -> Dimensions {
    samples
        .iter()
        .fold(Dimensions::EMPTY, |acc, s| acc.max(&s.complexity))
}

// ===========================================================================
// Tests
// ===========================================================================
