//! Application of finalized blocks to the [StateStore]
//!
//! A block is checked (height order, parent, slot, replayed or expired
//! transactions) before anything is written. Its executor state changes,
//! history entries and the updated chain state are then staged and committed
//! in a single atomic write. Elections at term boundaries run after that
//! commit against the new vote state; if one fails, the block stays applied and
//! [DelegateScheduler::schedule_next_term] with the chain state's
//! `current_term` can be retried on its own.

pub mod block;

pub use block::{Block, StateChange};

use crate::{
    hash::{BlockHash, TransactionHash},
    schedule::{DelegateScheduler, ScheduleError},
    state::{
        BlockHistory, ChainState, ChainStore, HistoryStore, ScheduleDelegate,
        TransactionExpiration, TransactionHistory, TransferCredit,
    },
    store::{
        column_families::{block_num_key, name_key, transfer_credit_key},
        fixed_keys::FixedKeys,
        StateBatch, StateStore, StoreError,
    },
    transaction::{
        actor::TrxActorMailbox,
        message::{RemoveExpiredTrxsReq, RemovePendingTrxsReq},
    },
};
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("expected block {expected}, got block {got}")]
    OutOfOrder { expected: u64, got: u64 },
    #[error("block parent {got} does not match head {expected}")]
    ParentMismatch { expected: BlockHash, got: BlockHash },
    #[error("block slot {slot} does not follow head slot {head_slot}")]
    SlotNotAdvanced { head_slot: u64, slot: u64 },
    #[error("transaction {trx_hash} already included")]
    DuplicateTransaction {
        trx_hash: TransactionHash,
        included_in: Option<BlockHash>,
    },
    #[error("transaction {trx_hash} expired at block {expire_block_num}, block is {block_num}")]
    Expired {
        trx_hash: TransactionHash,
        expire_block_num: u64,
        block_num: u64,
    },
    #[error("chain state missing, genesis not initialized")]
    MissingChainState,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub chain_state: ChainState,

    /// Schedule elected for the next term, set at term boundaries
    pub elected: Option<ScheduleDelegate>,
}

impl ApplyOutcome {
    /// An election ran and nobody was elected
    pub fn production_halted(&self) -> bool {
        self.elected.as_ref().is_some_and(ScheduleDelegate::is_empty)
    }
}

#[derive(Debug, Clone)]
pub struct BlockApplier {
    store: Arc<StateStore>,
    scheduler: DelegateScheduler,
    mailbox: Option<TrxActorMailbox>,
}

impl BlockApplier {
    pub fn new(store: Arc<StateStore>, scheduler: DelegateScheduler) -> Self {
        Self {
            store,
            scheduler,
            mailbox: None,
        }
    }

    /// Also evict included and expired transactions from the pending pool
    pub fn with_mailbox(mut self, mailbox: TrxActorMailbox) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    pub fn scheduler(&self) -> &DelegateScheduler {
        &self.scheduler
    }

    /// Apply one finalized block. Blocks must arrive in height order.
    #[instrument(skip_all, fields(block = block.number))]
    pub fn apply_block(&self, block: &Block) -> Result<ApplyOutcome, ApplyError> {
        let mut chain_state = self
            .store
            .get_chain_state()?
            .ok_or(ApplyError::MissingChainState)?;
        let slot = self.scheduler.get_slot_at_time(block.timestamp);

        check_position(&chain_state, block, slot)?;
        let trx_hashes = self.check_transactions(block)?;

        let mut batch = StateBatch::new();
        for change in &block.changes {
            self.stage_change(&mut batch, change)?;
        }

        batch.put(
            block_num_key(block.number),
            &BlockHistory {
                block_hash: block.hash,
            },
        )?;

        let max_lifetime = self.scheduler.core_state().max_trx_lifetime;
        for (trx, trx_hash) in block.transactions.iter().zip(&trx_hashes) {
            batch.put(
                trx_hash.as_bytes().to_vec(),
                &TransactionHistory {
                    block_hash: block.hash,
                },
            )?;
            batch.put(
                trx_hash.as_bytes().to_vec(),
                &TransactionExpiration {
                    trx_hash: *trx_hash,
                    expire_block_num: trx.expire_block_num(max_lifetime),
                },
            )?;
        }

        let term_boundary = self.scheduler.is_term_boundary(block.number);
        chain_state.head_block_num = block.number;
        chain_state.head_block_hash = block.hash;
        chain_state.head_block_time = block.timestamp;
        chain_state.head_block_delegate = block.delegate.clone();
        chain_state.record_filled_slot(slot);
        if term_boundary {
            chain_state.current_term += 1;
        }
        batch.put(StateStore::CHAIN_STATE_KEY.to_vec(), &chain_state)?;

        debug!("Committing {} writes", batch.len());
        self.store.commit(batch)?;
        info!(
            "Applied block {} ({}) by {} at slot {slot} with {} transactions",
            block.number,
            block.hash,
            block.delegate,
            block.transactions.len()
        );

        self.evict_from_pool(block);

        let elected = if term_boundary {
            Some(self.scheduler.schedule_next_term(chain_state.current_term)?)
        } else {
            None
        };

        Ok(ApplyOutcome {
            chain_state,
            elected,
        })
    }

    /// Hashes of the block's transactions, rejecting replays and expired ones
    fn check_transactions(&self, block: &Block) -> Result<Vec<TransactionHash>, ApplyError> {
        let max_lifetime = self.scheduler.core_state().max_trx_lifetime;
        let mut seen = HashSet::with_capacity(block.transactions.len());
        let mut trx_hashes = Vec::with_capacity(block.transactions.len());

        for trx in &block.transactions {
            let trx_hash = trx.hash();
            if !seen.insert(trx_hash) {
                warn!("Transaction {trx_hash} repeated within block {}", block.number);
                return Err(ApplyError::DuplicateTransaction {
                    trx_hash,
                    included_in: None,
                });
            }

            if let Some(included_in) = self.store.get_transaction_history(&trx_hash)? {
                warn!("Transaction {trx_hash} already included in block {included_in}");
                return Err(ApplyError::DuplicateTransaction {
                    trx_hash,
                    included_in: Some(included_in),
                });
            }

            if trx.is_expired(block.number, max_lifetime) {
                return Err(ApplyError::Expired {
                    trx_hash,
                    expire_block_num: trx.expire_block_num(max_lifetime),
                    block_num: block.number,
                });
            }
            trx_hashes.push(trx_hash);
        }
        Ok(trx_hashes)
    }

    fn stage_change(&self, batch: &mut StateBatch, change: &StateChange) -> Result<(), ApplyError> {
        match change {
            StateChange::SetAccount(account) => batch.put(name_key(&account.name), account)?,
            StateChange::SetBalance {
                account_name,
                balance,
            } => batch.put(name_key(account_name), balance)?,
            StateChange::SetStakedBalance {
                account_name,
                staked_balance,
            } => batch.put(name_key(account_name), staked_balance)?,
            StateChange::SetTransferCredit(credit) => batch.put(
                transfer_credit_key(&credit.owner, &credit.spender),
                credit,
            )?,
            StateChange::DeleteTransferCredit { owner, spender } => {
                batch.delete::<TransferCredit>(transfer_credit_key(owner, spender))
            }
            StateChange::SetDelegate(delegate) => self.store.stage_delegate(batch, delegate)?,
            StateChange::SetDelegateVotes(votes) => batch.put(name_key(&votes.voter), votes)?,
        }
        Ok(())
    }

    fn evict_from_pool(&self, block: &Block) {
        let Some(mailbox) = &self.mailbox else {
            return;
        };

        let removal = mailbox
            .remove_pending_trxs(RemovePendingTrxsReq {
                trxs: block.transactions.clone(),
            })
            .and_then(|_| {
                mailbox.remove_expired_trxs(RemoveExpiredTrxsReq {
                    head_block_num: block.number,
                    max_trx_lifetime: self.scheduler.core_state().max_trx_lifetime,
                })
            });
        if let Err(e) = removal {
            warn!("Unable to evict block {} transactions from pool: {e}", block.number);
        }
    }
}

fn check_position(chain_state: &ChainState, block: &Block, slot: u64) -> Result<(), ApplyError> {
    let expected = chain_state.head_block_num + 1;
    if block.number != expected {
        return Err(ApplyError::OutOfOrder {
            expected,
            got: block.number,
        });
    }

    // genesis has no parent to check against
    if chain_state.head_block_num > 0 && block.prev_hash != chain_state.head_block_hash {
        return Err(ApplyError::ParentMismatch {
            expected: chain_state.head_block_hash,
            got: block.prev_hash,
        });
    }

    if slot <= chain_state.current_absolute_slot {
        return Err(ApplyError::SlotNotAdvanced {
            head_slot: chain_state.current_absolute_slot,
            slot,
        });
    }
    Ok(())
}
