use super::{column_families::block_num_key, StateStore, StoreResult};
use crate::{
    hash::{BlockHash, TransactionHash},
    state::{BlockHistory, HistoryStore, TransactionExpiration, TransactionHistory},
};
use tracing::trace;

impl HistoryStore for StateStore {
    fn create_block_history_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<BlockHistory>()
    }

    fn set_block_history(&self, block_num: u64, block_hash: &BlockHash) -> StoreResult<()> {
        trace!("Setting block history {block_num} -> {block_hash}");
        self.put_typed(
            &block_num_key(block_num),
            &BlockHistory {
                block_hash: *block_hash,
            },
        )
    }

    fn get_block_history(&self, block_num: u64) -> StoreResult<Option<BlockHistory>> {
        trace!("Getting block history at {block_num}");
        self.get_typed(&block_num_key(block_num))
    }

    fn create_transaction_history_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<TransactionHistory>()
    }

    fn add_transaction_history(
        &self,
        trx_hash: &TransactionHash,
        block_hash: &BlockHash,
    ) -> StoreResult<()> {
        trace!("Adding transaction history {trx_hash} -> {block_hash}");
        self.put_typed(
            trx_hash.as_bytes(),
            &TransactionHistory {
                block_hash: *block_hash,
            },
        )
    }

    fn get_transaction_history(
        &self,
        trx_hash: &TransactionHash,
    ) -> StoreResult<Option<BlockHash>> {
        trace!("Getting transaction history of {trx_hash}");
        Ok(self
            .get_typed::<TransactionHistory>(trx_hash.as_bytes())?
            .map(|history| history.block_hash))
    }

    fn create_transaction_expiration_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<TransactionExpiration>()
    }

    fn set_transaction_expiration(
        &self,
        trx_hash: &TransactionHash,
        value: &TransactionExpiration,
    ) -> StoreResult<()> {
        trace!(
            "Setting expiration of {trx_hash} at block {}",
            value.expire_block_num
        );
        self.put_typed(trx_hash.as_bytes(), value)
    }

    fn get_transaction_expiration(
        &self,
        trx_hash: &TransactionHash,
    ) -> StoreResult<Option<TransactionExpiration>> {
        trace!("Getting expiration of {trx_hash}");
        self.get_typed(trx_hash.as_bytes())
    }
}
