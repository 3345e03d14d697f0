use blake2::{Blake2s256, Digest};
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const HASH_LEN: usize = 32;

/// 32-byte Blake2s digest identifying blocks and transactions
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; HASH_LEN]);

pub type BlockHash = Hash;
pub type TransactionHash = Hash;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashParseError {
    #[error("invalid hex: {0}")]
    Hex(String),
    #[error("expected {HASH_LEN} bytes, got {0}")]
    Length(usize),
}

impl Hash {
    pub fn digest(bytes: &[u8]) -> Self {
        let digest = Blake2s256::digest(bytes);
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(digest.as_slice());
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashParseError> {
        if bytes.len() != HASH_LEN {
            return Err(HashParseError::Length(bytes.len()));
        }
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }
}

impl FromStr for Hash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = HEXLOWER_PERMISSIVE
            .decode(s.as_bytes())
            .map_err(|e| HashParseError::Hex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", HEXLOWER.encode(&self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({self})")
    }
}
