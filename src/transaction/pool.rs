//! In-memory pool of transactions awaiting inclusion in a block
//!
//! Transactions are kept in admission order and indexed by their structural
//! hash. All operations take `&self` and are safe to call from many threads;
//! the [TransactionActor](super::actor::TransactionActor) is the intended
//! owner but direct callers never observe a half-applied mutation.

use super::Transaction;
use crate::hash::TransactionHash;
use std::{
    collections::{HashSet, VecDeque},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("duplicate transaction {0}")]
    Duplicate(TransactionHash),
}

#[derive(Debug, Default)]
pub struct TransactionPool {
    inner: RwLock<PoolInner>,
}

#[derive(Debug, Default)]
struct PoolInner {
    hashes: HashSet<TransactionHash>,
    pending: VecDeque<(TransactionHash, Transaction)>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `trx` unless a structurally equal transaction is already held
    pub fn push(&self, trx: Transaction) -> Result<TransactionHash, PoolError> {
        let hash = trx.hash();
        let mut inner = self.write();

        if !inner.hashes.insert(hash) {
            trace!("Rejecting duplicate transaction {hash}");
            return Err(PoolError::Duplicate(hash));
        }

        trace!("Adding transaction {hash}");
        inner.pending.push_back((hash, trx));
        Ok(hash)
    }

    /// Snapshot of all pending transactions in admission order
    pub fn get_all(&self) -> Vec<Transaction> {
        self.read()
            .pending
            .iter()
            .map(|(_, trx)| trx.clone())
            .collect()
    }

    /// Remove every given transaction that's present, returns the number removed
    pub fn remove(&self, trxs: &[Transaction]) -> usize {
        let targets: HashSet<TransactionHash> = trxs.iter().map(Transaction::hash).collect();
        let mut inner = self.write();
        let before = inner.pending.len();

        inner.pending.retain(|(hash, _)| !targets.contains(hash));
        for hash in &targets {
            inner.hashes.remove(hash);
        }

        let removed = before - inner.pending.len();
        trace!("Removed {removed} of {} requested transactions", targets.len());
        removed
    }

    /// Drop transactions which can no longer be included after `head_block_num`
    pub fn remove_expired(&self, head_block_num: u64, max_lifetime: u64) -> usize {
        let next_block_num = head_block_num.saturating_add(1);
        let mut inner = self.write();
        let before = inner.pending.len();

        let PoolInner { hashes, pending } = &mut *inner;
        pending.retain(|(hash, trx)| {
            let keep = !trx.is_expired(next_block_num, max_lifetime);
            if !keep {
                hashes.remove(hash);
            }
            keep
        });

        let removed = before - inner.pending.len();
        if removed > 0 {
            trace!("Removed {removed} expired transactions at block {head_block_num}");
        }
        removed
    }

    pub fn contains(&self, hash: &TransactionHash) -> bool {
        self.read().hashes.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.read().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // a panicking writer can't leave the pool half-mutated, every mutation
    // completes before the guard drops
    fn read(&self) -> RwLockReadGuard<'_, PoolInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, PoolInner> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
