use crate::helpers::{delegate, setup_new_db_dir};
use dpos_core::{
    state::{Delegate, DelegateStore, DelegateVotes, ScheduleDelegate},
    store::{StateBatch, StoreError},
    StateStore,
};
use pretty_assertions::assert_eq;

#[test]
fn delegate_reachable_by_both_keys() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("delegate-store-test")?;
    let store = StateStore::open(store_dir.path())?;
    let alice = delegate("alice");

    store.set_delegate(&alice)?;
    assert_eq!(store.get_delegate_by_account_name("alice")?, Some(alice.clone()));
    assert_eq!(store.get_delegate_by_sign_key("alice-key")?, Some(alice));

    assert_eq!(store.get_delegate_by_account_name("bob")?, None);
    assert_eq!(store.get_delegate_by_sign_key("bob-key")?, None);
    Ok(())
}

#[test]
fn sign_key_rotation() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("delegate-rotation-test")?;
    let store = StateStore::open(store_dir.path())?;

    store.set_delegate(&delegate("alice"))?;
    let rotated = Delegate {
        sign_key: "alice-key-2".to_string(),
        ..delegate("alice")
    };
    store.set_delegate(&rotated)?;

    assert_eq!(store.get_delegate_by_sign_key("alice-key")?, None);
    assert_eq!(store.get_delegate_by_sign_key("alice-key-2")?, Some(rotated.clone()));
    assert_eq!(store.get_delegate_by_account_name("alice")?, Some(rotated));
    assert_eq!(store.get_all_delegates()?.len(), 1);

    // the released key can be claimed by another delegate
    let bob = Delegate {
        sign_key: "alice-key".to_string(),
        ..delegate("bob")
    };
    store.set_delegate(&bob)?;
    assert_eq!(store.get_delegate_by_sign_key("alice-key")?, Some(bob));
    Ok(())
}

#[test]
fn sign_key_conflict_rejected() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("delegate-conflict-test")?;
    let store = StateStore::open(store_dir.path())?;
    store.set_delegate(&delegate("alice"))?;

    let bob = Delegate {
        sign_key: "alice-key".to_string(),
        ..delegate("bob")
    };
    let err = store.set_delegate(&bob).unwrap_err();
    assert!(matches!(
        err,
        StoreError::SignKeyConflict { ref owner, .. } if owner == "alice"
    ));

    // nothing of bob was written
    assert_eq!(store.get_delegate_by_account_name("bob")?, None);
    assert_eq!(store.get_delegate_by_sign_key("alice-key")?, Some(delegate("alice")));
    Ok(())
}

#[test]
fn staged_delegates_see_each_other() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("delegate-batch-test")?;
    let store = StateStore::open(store_dir.path())?;

    let mut batch = StateBatch::new();
    store.stage_delegate(&mut batch, &delegate("alice"))?;
    let bob = Delegate {
        sign_key: "alice-key".to_string(),
        ..delegate("bob")
    };
    assert!(store.stage_delegate(&mut batch, &bob).is_err());

    store.commit(batch)?;
    assert_eq!(store.get_delegate_by_sign_key("alice-key")?, Some(delegate("alice")));
    assert_eq!(store.get_delegate_by_account_name("bob")?, None);
    Ok(())
}

#[test]
fn all_delegates_and_votes() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("delegate-all-test")?;
    let store = StateStore::open(store_dir.path())?;

    for name in ["carol", "alice", "bob"] {
        store.set_delegate(&delegate(name))?;
    }
    let names: Vec<String> = store
        .get_all_delegates()?
        .into_iter()
        .map(|delegate| delegate.account_name)
        .collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);

    let vote = DelegateVotes {
        voter: "dave".to_string(),
        delegate: "bob".to_string(),
    };
    store.set_delegate_votes("dave", &vote)?;
    assert_eq!(store.get_delegate_votes("dave")?, Some(vote.clone()));
    assert_eq!(store.get_delegate_votes("erin")?, None);
    assert_eq!(store.get_all_delegate_votes()?, vec![vote]);
    Ok(())
}

#[test]
fn schedule_singleton() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("schedule-store-test")?;
    let store = StateStore::open(store_dir.path())?;
    assert_eq!(store.get_schedule_delegate()?, None);

    let schedule = ScheduleDelegate {
        term: 2,
        delegates: vec!["bob".to_string(), "alice".to_string()],
    };
    store.set_schedule_delegate(&schedule)?;
    assert_eq!(store.get_schedule_delegate()?, Some(schedule));
    Ok(())
}
