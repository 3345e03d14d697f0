use super::{Transaction, TrxSender};
use crate::hash::{BlockHash, TransactionHash};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTrxReq {
    pub trx: Transaction,
    pub trx_sender: TrxSender,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetAllPendingTrxReq {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovePendingTrxsReq {
    pub trxs: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveExpiredTrxsReq {
    pub head_block_num: u64,

    /// Lifetime the block applier enforces, see [CoreState](crate::state::CoreState)
    pub max_trx_lifetime: u64,
}

pub type PushTrxResp = Result<TransactionHash, TrxActorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrxActorError {
    #[error("duplicate transaction {0}")]
    Duplicate(TransactionHash),
    #[error("malformed transaction: {0}")]
    Malformed(String),
    #[error("transaction {trx_hash} already included in block {block_hash}")]
    AlreadyIncluded {
        trx_hash: TransactionHash,
        block_hash: BlockHash,
    },
    #[error("transaction {trx_hash} expired at block {expire_block_num}, head is {head_block_num}")]
    Expired {
        trx_hash: TransactionHash,
        expire_block_num: u64,
        head_block_num: u64,
    },
    #[error("admission lookup failed: {0}")]
    Store(String),
    #[error(transparent)]
    Mailbox(#[from] MailboxError),
}

/// Failures seen by the caller only, the actor is unaffected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailboxError {
    #[error("transaction actor mailbox is closed")]
    Closed,
    #[error("transaction actor dropped the reply")]
    Cancelled,
    #[error("no reply from transaction actor within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug)]
pub(crate) enum TrxActorMessage {
    PushTrx {
        req: PushTrxReq,
        reply: oneshot::Sender<PushTrxResp>,
    },
    GetAllPendingTrx {
        req: GetAllPendingTrxReq,
        reply: oneshot::Sender<Vec<Transaction>>,
    },
    RemovePendingTrxs(RemovePendingTrxsReq),
    RemoveExpiredTrxs(RemoveExpiredTrxsReq),
}

impl PushTrxReq {
    pub fn new(trx: Transaction, trx_sender: TrxSender) -> Self {
        Self { trx, trx_sender }
    }
}

impl TrxActorMessage {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::PushTrx { .. } => "PushTrxReq",
            Self::GetAllPendingTrx { .. } => "GetAllPendingTrxReq",
            Self::RemovePendingTrxs(_) => "RemovePendingTrxsReq",
            Self::RemoveExpiredTrxs(_) => "RemoveExpiredTrxsReq",
        }
    }
}
