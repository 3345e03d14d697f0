use crate::helpers::{
    delegate, genesis_store, register_backed_delegate, setup_new_db_dir, test_core_state,
};
use dpos_core::{
    schedule::ScheduleError,
    state::{AccountStore, DelegateStore, DelegateVotes, StakedBalance},
    DelegateScheduler,
};
use pretty_assertions::assert_eq;

#[test]
fn top_weighted_delegates_elected() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("election-test")?;
    let store = genesis_store(&store_dir, &test_core_state())?;
    let scheduler = DelegateScheduler::new(store.clone(), test_core_state());

    register_backed_delegate(&store, "alice", 50)?;
    register_backed_delegate(&store, "bob", 70)?;
    register_backed_delegate(&store, "carol", 50)?;
    register_backed_delegate(&store, "dave", 10)?;

    // 3 delegates per term, alice wins the tie with carol by name
    assert_eq!(
        scheduler.elect_next_term_delegates()?,
        vec!["bob", "alice", "carol"]
    );
    Ok(())
}

#[test]
fn votes_accumulate_and_unbacked_votes_ignored() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("election-weight-test")?;
    let store = genesis_store(&store_dir, &test_core_state())?;
    let scheduler = DelegateScheduler::new(store.clone(), test_core_state());

    register_backed_delegate(&store, "alice", 10)?;
    store.set_delegate(&delegate("bob"))?;

    // two voters for bob outweigh alice
    for (voter, stake) in [("v1", 6), ("v2", 6)] {
        store.set_staked_balance(voter, &StakedBalance { staked_balance: stake })?;
        store.set_delegate_votes(
            voter,
            &DelegateVotes {
                voter: voter.to_string(),
                delegate: "bob".to_string(),
            },
        )?;
    }

    // a vote without staked balance, and one for an unregistered name
    store.set_delegate_votes(
        "v3",
        &DelegateVotes {
            voter: "v3".to_string(),
            delegate: "alice".to_string(),
        },
    )?;
    store.set_staked_balance("v4", &StakedBalance { staked_balance: 1_000 })?;
    store.set_delegate_votes(
        "v4",
        &DelegateVotes {
            voter: "v4".to_string(),
            delegate: "mallory".to_string(),
        },
    )?;

    let ranked = scheduler.rank_candidates()?;
    assert_eq!(
        ranked,
        vec![("bob".to_string(), 12), ("alice".to_string(), 10)]
    );
    Ok(())
}

#[test]
fn election_is_deterministic_across_stores() -> anyhow::Result<()> {
    let first_dir = setup_new_db_dir("election-det-a")?;
    let second_dir = setup_new_db_dir("election-det-b")?;
    let first = genesis_store(&first_dir, &test_core_state())?;
    let second = genesis_store(&second_dir, &test_core_state())?;

    let delegates = [("erin", 5), ("dave", 5), ("carol", 9), ("bob", 1), ("alice", 5)];
    for &(name, stake) in &delegates {
        register_backed_delegate(&first, name, stake)?;
    }
    for &(name, stake) in delegates.iter().rev() {
        register_backed_delegate(&second, name, stake)?;
    }

    let first_elected = DelegateScheduler::load(first)?.elect_next_term_delegates()?;
    let second_elected = DelegateScheduler::load(second)?.elect_next_term_delegates()?;

    assert_eq!(first_elected, vec!["carol", "alice", "dave"]);
    assert_eq!(first_elected, second_elected);
    Ok(())
}

#[test]
fn empty_election_halts_production() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("election-empty-test")?;
    let store = genesis_store(&store_dir, &test_core_state())?;
    let scheduler = DelegateScheduler::new(store.clone(), test_core_state());

    assert!(scheduler.elect_next_term_delegates()?.is_empty());

    let schedule = scheduler.schedule_next_term(1)?;
    assert!(schedule.is_empty());
    assert_eq!(store.get_schedule_delegate()?, Some(schedule));
    assert!(matches!(
        scheduler.get_candidate_by_slot(0),
        Err(ScheduleError::NoSchedule { .. })
    ));
    Ok(())
}

#[test]
fn genesis_schedule_elected_once() -> anyhow::Result<()> {
    let store_dir = setup_new_db_dir("election-genesis-test")?;
    let store = genesis_store(&store_dir, &test_core_state())?;
    let scheduler = DelegateScheduler::new(store.clone(), test_core_state());
    let genesis = [delegate("bob"), delegate("alice")];

    let schedule = scheduler.init_genesis_schedule(&genesis)?.unwrap();
    assert_eq!(schedule.term, 0);
    assert_eq!(schedule.delegates, vec!["alice", "bob"]);
    assert_eq!(store.get_delegate_by_sign_key("bob-key")?, Some(delegate("bob")));

    assert_eq!(scheduler.init_genesis_schedule(&[delegate("carol")])?, None);
    assert_eq!(store.get_delegate_by_account_name("carol")?, None);
    Ok(())
}
