//! Complexity dimensions and the fixed-arity vector indexed by them.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of tracked complexity dimensions.
pub const DIMENSION_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Dimension
// ---------------------------------------------------------------------------

/// One independent axis of resource consumption tracked per block.
///
/// The discriminant is the slot index into [`Dimensions`]; the ordering is
/// shared by every component and by the on-disk record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Bandwidth = 0,
    DbRead = 1,
    DbWrite = 2,
    Compute = 3,
}

impl Dimension {
    /// All dimensions in slot order.
    pub const ALL: [Dimension; DIMENSION_COUNT] = [
        Dimension::Bandwidth,
        Dimension::DbRead,
        Dimension::DbWrite,
        Dimension::Compute,
    ];

    /// Slot index of this dimension.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase name, used in logs, CSV headers and config files.
    pub const fn name(self) -> &'static str {
        match self {
            Dimension::Bandwidth => "bandwidth",
            Dimension::DbRead => "db_read",
            Dimension::DbWrite => "db_write",
            Dimension::Compute => "compute",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a dimension name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dimension '{0}' (expected bandwidth, db_read, db_write or compute)")]
pub struct UnknownDimension(pub String);

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bandwidth" => Ok(Dimension::Bandwidth),
            "db_read" | "dbread" | "read" | "reads" => Ok(Dimension::DbRead),
            "db_write" | "dbwrite" | "write" | "writes" => Ok(Dimension::DbWrite),
            "compute" => Ok(Dimension::Compute),
            _ => Err(UnknownDimension(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// A per-block complexity vector: one non-negative value per [`Dimension`].
///
/// Also used for anything else that is naturally "one number per dimension":
/// historical maxima, target rates, fee weights, replayed rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimensions(pub [u64; DIMENSION_COUNT]);

impl Dimensions {
    /// The all-zero vector.
    pub const EMPTY: Dimensions = Dimensions([0; DIMENSION_COUNT]);

    pub const fn new(values: [u64; DIMENSION_COUNT]) -> Self {
        Self(values)
    }

    /// Vector with the same value in every slot.
    pub const fn splat(value: u64) -> Self {
        Self([value; DIMENSION_COUNT])
    }

    /// Whether every slot is zero (an empty block).
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    #[inline]
    pub fn get(&self, dimension: Dimension) -> u64 {
        self.0[dimension.index()]
    }

    /// Iterate `(dimension, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, u64)> + '_ {
        Dimension::ALL.iter().map(move |&d| (d, self.0[d.index()]))
    }

    /// Weighted sum `sum(self[d] * weights[d])`, `None` on overflow.
    pub fn checked_dot(&self, weights: &Dimensions) -> Option<u64> {
        self.0
            .iter()
            .zip(weights.0.iter())
            .try_fold(0u64, |acc, (&v, &w)| acc.checked_add(v.checked_mul(w)?))
    }

    /// Slot-wise maximum of two vectors.
    pub fn max(&self, other: &Dimensions) -> Dimensions {
        let mut out = *self;
        for (slot, &v) in out.0.iter_mut().zip(other.0.iter()) {
            *slot = (*slot).max(v);
        }
        out
    }

    /// Build a vector by evaluating `f` for every dimension.
    pub fn from_fn(mut f: impl FnMut(Dimension) -> u64) -> Self {
        let mut out = Self::EMPTY;
        for d in Dimension::ALL {
            out.0[d.index()] = f(d);
        }
        out
    }
}

impl Index<Dimension> for Dimensions {
    type Output = u64;

    fn index(&self, dimension: Dimension) -> &u64 {
        &self.0[dimension.index()]
    }
}

impl IndexMut<Dimension> for Dimensions {
    fn index_mut(&mut self, dimension: Dimension) -> &mut u64 {
        &mut self.0[dimension.index()]
    }
}

impl From<[u64; DIMENSION_COUNT]> for Dimensions {
    fn from(values: [u64; DIMENSION_COUNT]) -> Self {
        Self(values)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (d, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}: {v}")?;
        }
        write!(f, "]")
    }
}

// ===========================================================================
// Tests
// ===========================================================================
