use crate::helpers::{genesis_store, setup_new_db_dir, test_core_state};
use dpos_core::{
    hash::Hash,
    state::{ChainState, ChainStore, HistoryStore},
    transaction::{
        message::{
            MailboxError, PushTrxReq, RemoveExpiredTrxsReq, RemovePendingTrxsReq, TrxActorError,
        },
        TrxSender,
    },
    Transaction, TransactionActor, TransactionPool,
};
use pretty_assertions::assert_eq;
use std::{sync::Arc, time::Duration};

const TIMEOUT: Duration = Duration::from_millis(500);

fn spawn_actor() -> (
    Arc<TransactionPool>,
    dpos_core::TrxActorMailbox,
    tokio::task::JoinHandle<()>,
) {
    let pool = Arc::new(TransactionPool::new());
    let (mailbox, handle) = TransactionActor::spawn(pool.clone(), &test_core_state(), TIMEOUT);
    (pool, mailbox, handle)
}

#[tokio::test]
async fn push_get_remove() {
    let (_, mailbox, _) = spawn_actor();
    let trx = Transaction::new(11, 22, 1);

    mailbox
        .push_trx(PushTrxReq::new(trx.clone(), TrxSender::Front))
        .await
        .unwrap();
    assert_eq!(mailbox.get_all_pending_trx().await.unwrap(), vec![trx.clone()]);

    mailbox
        .remove_pending_trxs(RemovePendingTrxsReq { trxs: vec![trx] })
        .unwrap();

    // mailbox order puts the removal ahead of this read
    assert!(mailbox.get_all_pending_trx().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_push_rejected() {
    let (_, mailbox, _) = spawn_actor();
    let trx = Transaction::new(11, 22, 1);

    let hash = mailbox
        .push_trx(PushTrxReq::new(trx.clone(), TrxSender::Front))
        .await
        .unwrap();
    let dup = mailbox
        .push_trx(PushTrxReq::new(trx.clone(), TrxSender::Peer))
        .await;

    assert_eq!(dup, Err(TrxActorError::Duplicate(hash)));
    assert_eq!(mailbox.get_all_pending_trx().await.unwrap(), vec![trx]);
}

#[tokio::test]
async fn malformed_push_rejected() {
    let (pool, mailbox, _) = spawn_actor();
    let trx = Transaction::with_payload(1, 1, Vec::<u8>::new());

    let resp = mailbox
        .push_trx(PushTrxReq::new(trx, TrxSender::Peer))
        .await;
    assert!(matches!(resp, Err(TrxActorError::Malformed(_))));
    assert!(pool.is_empty());
}

#[tokio::test]
async fn concurrent_producers_see_one_admission() {
    let (_, mailbox, _) = spawn_actor();
    let trx = Transaction::new(5, 6, 7);

    let pushes: Vec<_> = (0..16)
        .map(|_| {
            let mailbox = mailbox.clone();
            let trx = trx.clone();
            tokio::spawn(async move {
                mailbox
                    .push_trx(PushTrxReq::new(trx, TrxSender::Peer))
                    .await
            })
        })
        .collect();

    let mut admitted = 0;
    for push in pushes {
        match push.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(e) => assert!(matches!(e, TrxActorError::Duplicate(_))),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(mailbox.get_all_pending_trx().await.unwrap().len(), 1);
}

#[tokio::test]
async fn expired_transactions_removed() {
    let (_, mailbox, _) = spawn_actor();
    let old = Transaction::new(1, 1, 1);
    let fresh = Transaction::new(20, 1, 1);

    for trx in [&old, &fresh] {
        mailbox
            .push_trx(PushTrxReq::new(trx.clone(), TrxSender::Front))
            .await
            .unwrap();
    }

    // lifetime 10, `old` expires after block 11
    mailbox
        .remove_expired_trxs(RemoveExpiredTrxsReq {
            head_block_num: 12,
            max_trx_lifetime: 10,
        })
        .unwrap();
    assert_eq!(mailbox.get_all_pending_trx().await.unwrap(), vec![fresh]);
}

#[tokio::test]
async fn unserviced_mailbox_times_out() {
    let pool = Arc::new(TransactionPool::new());

    // never run, the request stays queued
    let (_actor, mailbox) =
        TransactionActor::new(pool.clone(), &test_core_state(), Duration::from_millis(20));

    let resp = mailbox
        .push_trx(PushTrxReq::new(Transaction::new(1, 2, 3), TrxSender::Front))
        .await;
    assert_eq!(
        resp,
        Err(TrxActorError::Mailbox(MailboxError::Timeout(
            Duration::from_millis(20)
        )))
    );
    assert!(pool.is_empty());
}

#[tokio::test]
async fn dropped_actor_closes_mailbox() {
    let pool = Arc::new(TransactionPool::new());
    let (actor, mailbox) = TransactionActor::new(pool, &test_core_state(), TIMEOUT);
    drop(actor);

    assert!(mailbox.is_closed());
    assert_eq!(
        mailbox.get_all_pending_trx().await,
        Err(MailboxError::Closed)
    );
    assert_eq!(
        mailbox.remove_pending_trxs(RemovePendingTrxsReq::default()),
        Err(MailboxError::Closed)
    );
}

#[tokio::test]
async fn actor_stops_when_mailboxes_dropped() {
    let (pool, mailbox, handle) = spawn_actor();
    mailbox
        .push_trx(PushTrxReq::new(Transaction::new(1, 1, 1), TrxSender::Front))
        .await
        .unwrap();

    drop(mailbox);
    handle.await.unwrap();
    assert_eq!(pool.len(), 1);
}

#[tokio::test]
async fn removing_unknown_transaction_is_silent() {
    let (_, mailbox, _) = spawn_actor();
    let held = Transaction::new(11, 22, 1);
    mailbox
        .push_trx(PushTrxReq::new(held.clone(), TrxSender::Front))
        .await
        .unwrap();

    assert_eq!(
        mailbox.remove_pending_trxs(RemovePendingTrxsReq {
            trxs: vec![Transaction::new(99, 99, 99)],
        }),
        Ok(())
    );
    assert_eq!(mailbox.get_all_pending_trx().await.unwrap(), vec![held]);
}

#[tokio::test]
async fn included_transaction_not_readmitted() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("actor-included-test")?;
    let store = genesis_store(&store_dir, &test_core_state())?;
    let pool = Arc::new(TransactionPool::new());
    let (actor, mailbox) = TransactionActor::new(pool.clone(), &test_core_state(), TIMEOUT);
    let _handle = actor.with_store(store.clone()).start();

    let trx = Transaction::new(0, 22, 1);
    let block_hash = Hash::digest(b"block 1");
    store.add_transaction_history(&trx.hash(), &block_hash)?;

    let resp = mailbox
        .push_trx(PushTrxReq::new(trx.clone(), TrxSender::Peer))
        .await;
    assert_eq!(
        resp,
        Err(TrxActorError::AlreadyIncluded {
            trx_hash: trx.hash(),
            block_hash,
        })
    );
    assert!(pool.is_empty());
    Ok(())
}

#[tokio::test]
async fn stale_transaction_not_admitted() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("actor-stale-test")?;
    let store = genesis_store(&store_dir, &test_core_state())?;
    store.set_chain_state(&ChainState {
        head_block_num: 10,
        ..ChainState::genesis(1_000)
    })?;

    let pool = Arc::new(TransactionPool::new());
    let (actor, mailbox) = TransactionActor::new(pool.clone(), &test_core_state(), TIMEOUT);
    let _handle = actor.with_store(store).start();

    // lifetime 10, referencing block 0 its last block is 10 and the next is 11
    let stale = Transaction::new(0, 1, 1);
    let resp = mailbox
        .push_trx(PushTrxReq::new(stale.clone(), TrxSender::Peer))
        .await;
    assert_eq!(
        resp,
        Err(TrxActorError::Expired {
            trx_hash: stale.hash(),
            expire_block_num: 10,
            head_block_num: 10,
        })
    );

    let fresh = Transaction::new(1, 1, 1);
    mailbox
        .push_trx(PushTrxReq::new(fresh.clone(), TrxSender::Peer))
        .await?;
    assert_eq!(pool.get_all(), vec![fresh]);
    Ok(())
}
