mod store;

pub mod helpers {
    use dpos_core::{
        state::{AccountStore, CoreState, Delegate, DelegateStore, DelegateVotes, StakedBalance},
        StateStore,
    };
    use std::sync::Arc;

    /// Sets up a new temp dir, deleted when it goes out of scope
    pub fn setup_new_db_dir(prefix: &str) -> anyhow::Result<tempfile::TempDir> {
        let store_dir = tempfile::TempDir::with_prefix(prefix)?;
        if store_dir.path().exists() {
            std::fs::remove_dir_all(store_dir.path())?;
        }
        Ok(store_dir)
    }

    /// Store at `store_dir` seeded with `core_state`
    pub fn genesis_store(
        store_dir: &tempfile::TempDir,
        core_state: &CoreState,
    ) -> anyhow::Result<Arc<StateStore>> {
        let store = StateStore::open(store_dir.path())?;
        store.init_genesis(core_state)?;
        Ok(Arc::new(store))
    }

    pub fn test_core_state() -> CoreState {
        CoreState {
            genesis_time: 1_000,
            block_interval: 3,
            delegates_per_term: 3,
            blocks_per_term: 4,
            max_trx_lifetime: 10,
        }
    }

    pub fn delegate(name: &str) -> Delegate {
        Delegate {
            account_name: name.to_string(),
            sign_key: format!("{name}-key"),
            location: "earth".to_string(),
            description: format!("delegate {name}"),
        }
    }

    /// Register `name` as a delegate backed by a single voter staking `stake`
    pub fn register_backed_delegate(
        store: &StateStore,
        name: &str,
        stake: u64,
    ) -> anyhow::Result<()> {
        store.set_delegate(&delegate(name))?;

        let voter = format!("{name}-voter");
        store.set_staked_balance(&voter, &StakedBalance { staked_balance: stake })?;
        store.set_delegate_votes(
            &voter,
            &DelegateVotes {
                voter: voter.clone(),
                delegate: name.to_string(),
            },
        )?;
        Ok(())
    }
}
