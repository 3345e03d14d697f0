//! Single-consumer gateway to the [TransactionPool]
//!
//! Producers hold a cloneable [TrxActorMailbox]. Requests needing a reply
//! carry a oneshot sender and are awaited with the mailbox's timeout; removals
//! are fire-and-forget. The actor drains its mailbox one message at a time on
//! its own task and stops once every mailbox has been dropped.
//!
//! With a [StateStore] attached, pushes of transactions already included in a
//! block, or too old for the next block, are rejected before reaching the pool.

use super::{
    message::{
        GetAllPendingTrxReq, MailboxError, PushTrxReq, PushTrxResp, RemoveExpiredTrxsReq,
        RemovePendingTrxsReq, TrxActorError, TrxActorMessage,
    },
    pool::{PoolError, TransactionPool},
    Transaction,
};
use crate::{
    hash::TransactionHash,
    state::{ChainStore, CoreState, HistoryStore},
    store::{StateStore, StoreError},
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, instrument, trace, warn};

#[derive(Debug)]
pub struct TransactionActor {
    pool: Arc<TransactionPool>,
    inbox: mpsc::UnboundedReceiver<TrxActorMessage>,
    max_trx_lifetime: u64,
    store: Option<Arc<StateStore>>,
}

#[derive(Debug, Clone)]
pub struct TrxActorMailbox {
    sender: mpsc::UnboundedSender<TrxActorMessage>,
    timeout: Duration,
}

impl TransactionActor {
    /// Admission uses `core_state.max_trx_lifetime`, the lifetime blocks are
    /// checked against
    pub fn new(
        pool: Arc<TransactionPool>,
        core_state: &CoreState,
        timeout: Duration,
    ) -> (Self, TrxActorMailbox) {
        let (sender, inbox) = mpsc::unbounded_channel();
        let actor = Self {
            pool,
            inbox,
            max_trx_lifetime: core_state.max_trx_lifetime,
            store: None,
        };
        (actor, TrxActorMailbox { sender, timeout })
    }

    /// Check pushes against the store's transaction history and head block
    pub fn with_store(mut self, store: Arc<StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Spawn a store-less actor on the current tokio runtime
    pub fn spawn(
        pool: Arc<TransactionPool>,
        core_state: &CoreState,
        timeout: Duration,
    ) -> (TrxActorMailbox, JoinHandle<()>) {
        let (actor, mailbox) = Self::new(pool, core_state, timeout);
        (mailbox, actor.start())
    }

    /// Spawn this actor on the current tokio runtime
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub fn pool(&self) -> &Arc<TransactionPool> {
        &self.pool
    }

    #[instrument(skip_all)]
    pub async fn run(mut self) {
        debug!("Transaction actor started");
        while let Some(msg) = self.inbox.recv().await {
            trace!("Handling {}", msg.kind());
            self.handle(msg);
        }
        debug!("Transaction actor mailbox closed, {} pending", self.pool.len());
    }

    fn handle(&self, msg: TrxActorMessage) {
        match msg {
            TrxActorMessage::PushTrx { req, reply } => {
                let resp = self.push_trx(req);
                if reply.send(resp).is_err() {
                    trace!("Push requester went away before the reply");
                }
            }
            TrxActorMessage::GetAllPendingTrx {
                req: GetAllPendingTrxReq {},
                reply,
            } => {
                if reply.send(self.pool.get_all()).is_err() {
                    trace!("Snapshot requester went away before the reply");
                }
            }
            TrxActorMessage::RemovePendingTrxs(RemovePendingTrxsReq { trxs }) => {
                let removed = self.pool.remove(&trxs);
                debug!("Removed {removed} pending transactions");
            }
            TrxActorMessage::RemoveExpiredTrxs(RemoveExpiredTrxsReq {
                head_block_num,
                max_trx_lifetime,
            }) => {
                let removed = self.pool.remove_expired(head_block_num, max_trx_lifetime);
                debug!("Removed {removed} expired transactions at block {head_block_num}");
            }
        }
    }

    fn push_trx(&self, req: PushTrxReq) -> PushTrxResp {
        let PushTrxReq { trx, trx_sender } = req;
        if let Some(reason) = trx.malformed_reason() {
            warn!("Rejecting malformed transaction from {trx_sender}: {reason}");
            return Err(TrxActorError::Malformed(reason.to_string()));
        }
        if let Err(e) = self.check_chain(&trx) {
            warn!("Rejecting transaction from {trx_sender}: {e}");
            return Err(e);
        }

        match self.pool.push(trx) {
            Ok(hash) => {
                debug!("Admitted transaction {hash} from {trx_sender}");
                Ok(hash)
            }
            Err(PoolError::Duplicate(hash)) => {
                debug!("Duplicate transaction {hash} from {trx_sender}");
                Err(TrxActorError::Duplicate(hash))
            }
        }
    }

    /// Reject `trx` if it's already in a block or can't make the next one
    fn check_chain(&self, trx: &Transaction) -> Result<(), TrxActorError> {
        let Some(store) = &self.store else {
            return Ok(());
        };

        let trx_hash = trx.hash();
        let lookup = |e: StoreError| TrxActorError::Store(e.to_string());
        if let Some(block_hash) = store.get_transaction_history(&trx_hash).map_err(lookup)? {
            return Err(TrxActorError::AlreadyIncluded {
                trx_hash,
                block_hash,
            });
        }

        let head_block_num = store
            .get_chain_state()
            .map_err(lookup)?
            .map(|chain_state| chain_state.head_block_num)
            .unwrap_or_default();
        if trx.is_expired(head_block_num.saturating_add(1), self.max_trx_lifetime) {
            return Err(TrxActorError::Expired {
                trx_hash,
                expire_block_num: trx.expire_block_num(self.max_trx_lifetime),
                head_block_num,
            });
        }
        Ok(())
    }
}

impl TrxActorMailbox {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Push a transaction and wait for the admission result.
    ///
    /// On [MailboxError::Timeout] the push may still have been applied; a
    /// repeated push then reports [TrxActorError::Duplicate].
    pub async fn push_trx(&self, req: PushTrxReq) -> Result<TransactionHash, TrxActorError> {
        self.ask(|reply| TrxActorMessage::PushTrx { req, reply })
            .await?
    }

    /// Snapshot of the pending transactions
    pub async fn get_all_pending_trx(&self) -> Result<Vec<Transaction>, MailboxError> {
        self.ask(|reply| TrxActorMessage::GetAllPendingTrx {
            req: GetAllPendingTrxReq {},
            reply,
        })
        .await
    }

    /// Fire-and-forget removal, only fails if the actor is gone
    pub fn remove_pending_trxs(&self, req: RemovePendingTrxsReq) -> Result<(), MailboxError> {
        self.tell(TrxActorMessage::RemovePendingTrxs(req))
    }

    pub fn remove_expired_trxs(&self, req: RemoveExpiredTrxsReq) -> Result<(), MailboxError> {
        self.tell(TrxActorMessage::RemoveExpiredTrxs(req))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn ask<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TrxActorMessage,
    ) -> Result<T, MailboxError> {
        let (reply, response) = oneshot::channel();
        self.tell(build(reply))?;

        match tokio::time::timeout(self.timeout, response).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(MailboxError::Cancelled),
            Err(_) => Err(MailboxError::Timeout(self.timeout)),
        }
    }

    fn tell(&self, msg: TrxActorMessage) -> Result<(), MailboxError> {
        self.sender.send(msg).map_err(|_| MailboxError::Closed)
    }
}
