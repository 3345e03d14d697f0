use crate::{
    hash::BlockHash,
    state::{Account, Balance, Delegate, DelegateVotes, StakedBalance, TransferCredit},
    transaction::Transaction,
};
use serde::{Deserialize, Serialize};

/// A finalized block together with the executor's resulting state changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: u64,
    pub hash: BlockHash,
    pub prev_hash: BlockHash,

    /// Unix time (seconds) of the block's slot
    pub timestamp: u64,

    /// Account name of the producing delegate
    pub delegate: String,
    pub transactions: Vec<Transaction>,
    pub changes: Vec<StateChange>,
}

/// Post-execution values, each overwrites the stored entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    SetAccount(Account),
    SetBalance {
        account_name: String,
        balance: Balance,
    },
    SetStakedBalance {
        account_name: String,
        staked_balance: StakedBalance,
    },
    SetTransferCredit(TransferCredit),
    DeleteTransferCredit {
        owner: String,
        spender: String,
    },
    SetDelegate(Delegate),
    SetDelegateVotes(DelegateVotes),
}

impl Block {
    /// Hash of the block header fields and its transaction hashes
    pub fn compute_hash(&self) -> BlockHash {
        let mut bytes = Vec::with_capacity(64 + 32 * self.transactions.len());
        bytes.extend_from_slice(&self.number.to_be_bytes());
        bytes.extend_from_slice(self.prev_hash.as_bytes());
        bytes.extend_from_slice(&self.timestamp.to_be_bytes());
        bytes.extend_from_slice(self.delegate.as_bytes());
        for trx in &self.transactions {
            bytes.extend_from_slice(trx.hash().as_bytes());
        }
        BlockHash::digest(&bytes)
    }
}
