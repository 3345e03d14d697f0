pub mod actor;
pub mod message;
pub mod pool;

use crate::hash::TransactionHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque payload handed to the executor unmodified
#[derive(Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action(pub Vec<u8>);

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    /// Block height the transaction references, for expiration and replay checks
    pub ref_block_num: u64,
    pub sender: u64,
    pub action: Action,
}

/// Provenance of a pushed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrxSender {
    Front,
    Peer,
}

impl Transaction {
    /// Transaction whose action is a single numeric code
    pub fn new(ref_block_num: u64, sender: u64, action: u64) -> Self {
        Self::with_payload(ref_block_num, sender, action)
    }

    pub fn with_payload(ref_block_num: u64, sender: u64, action: impl Into<Action>) -> Self {
        Self {
            ref_block_num,
            sender,
            action: action.into(),
        }
    }

    /// Structural identity, equal content hashes equally
    pub fn hash(&self) -> TransactionHash {
        // bcs only fails on sequences over 2^31 elements or nesting past its
        // depth limit, a transaction is flat and its payload far smaller
        let bytes = bcs::to_bytes(self).expect("transaction is bcs serializable");
        TransactionHash::digest(&bytes)
    }

    /// Height after which the transaction may no longer be included
    pub fn expire_block_num(&self, max_lifetime: u64) -> u64 {
        self.ref_block_num.saturating_add(max_lifetime)
    }

    pub fn is_expired(&self, block_num: u64, max_lifetime: u64) -> bool {
        block_num > self.expire_block_num(max_lifetime)
    }

    /// Reason the transaction can't be admitted, if any
    pub fn malformed_reason(&self) -> Option<&'static str> {
        if self.action.0.is_empty() {
            return Some("empty action payload");
        }
        None
    }
}

impl From<u64> for Action {
    fn from(value: u64) -> Self {
        Self(value.to_be_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Action {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Action {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({} bytes)", self.0.len())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction {{ ref_block_num: {}, sender: {}, action: {:?} }}",
            self.ref_block_num, self.sender, self.action
        )
    }
}

impl fmt::Display for TrxSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Peer => write!(f, "peer"),
        }
    }
}
