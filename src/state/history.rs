use crate::{
    hash::{BlockHash, TransactionHash},
    store::StoreResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHistory {
    pub block_hash: BlockHash,
}

/// Containing block of an included transaction
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHistory {
    pub block_hash: BlockHash,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionExpiration {
    pub trx_hash: TransactionHash,

    /// Last block height at which the transaction could be included
    pub expire_block_num: u64,
}

pub trait HistoryStore {
    fn create_block_history_schema(&self) -> StoreResult<()>;

    fn set_block_history(&self, block_num: u64, block_hash: &BlockHash) -> StoreResult<()>;

    fn get_block_history(&self, block_num: u64) -> StoreResult<Option<BlockHistory>>;

    fn create_transaction_history_schema(&self) -> StoreResult<()>;

    fn add_transaction_history(
        &self,
        trx_hash: &TransactionHash,
        block_hash: &BlockHash,
    ) -> StoreResult<()>;

    /// Hash of the block which included `trx_hash`
    fn get_transaction_history(&self, trx_hash: &TransactionHash)
        -> StoreResult<Option<BlockHash>>;

    fn create_transaction_expiration_schema(&self) -> StoreResult<()>;

    fn set_transaction_expiration(
        &self,
        trx_hash: &TransactionHash,
        value: &TransactionExpiration,
    ) -> StoreResult<()>;

    fn get_transaction_expiration(
        &self,
        trx_hash: &TransactionHash,
    ) -> StoreResult<Option<TransactionExpiration>>;
}
