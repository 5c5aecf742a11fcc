//! 32-byte block identifiers in their CB58 text form.
//!
//! CB58 is base58 over the payload followed by the last four bytes of the
//! payload's SHA-256 digest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Length of a block identifier in bytes.
pub const ID_LEN: usize = 32;

const CHECKSUM_LEN: usize = 4;

/// Errors produced while parsing a CB58 block identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("invalid base58 encoding: {0}")]
    Encoding(String),
    #[error("decoded identifier is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },
    #[error("checksum mismatch")]
    Checksum,
}

/// Opaque 32-byte block identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BlockId(pub [u8; ID_LEN]);

impl BlockId {
    /// The all-zero identifier, used for synthetic samples.
    pub const EMPTY: BlockId = BlockId([0; ID_LEN]);

    pub const fn new(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }
}

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

impl FromStr for BlockId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| IdError::Encoding(e.to_string()))?;
        if raw.len() != ID_LEN + CHECKSUM_LEN {
            return Err(IdError::Length {
                expected: ID_LEN,
                actual: raw.len().saturating_sub(CHECKSUM_LEN),
            });
        }
        let (payload, sum) = raw.split_at(ID_LEN);
        if checksum(payload)[..] != *sum {
            return Err(IdError::Checksum);
        }
        let mut bytes = [0u8; ID_LEN];
        bytes.copy_from_slice(payload);
        Ok(Self(bytes))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(ID_LEN + CHECKSUM_LEN);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&checksum(&self.0));
        f.write_str(&bs58::encode(raw).into_string())
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({self})")
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
