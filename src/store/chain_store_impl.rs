use super::{fixed_keys::FixedKeys, StateStore, StoreResult};
use crate::state::{ChainState, ChainStore, CoreState};
use tracing::trace;

impl ChainStore for StateStore {
    fn create_chain_state_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<ChainState>()
    }

    fn set_chain_state(&self, value: &ChainState) -> StoreResult<()> {
        trace!(
            "Setting chain state at block {} slot {}",
            value.head_block_num,
            value.current_absolute_slot
        );
        self.put_typed(Self::CHAIN_STATE_KEY, value)
    }

    fn get_chain_state(&self) -> StoreResult<Option<ChainState>> {
        trace!("Getting chain state");
        self.get_typed(Self::CHAIN_STATE_KEY)
    }

    fn create_core_state_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<CoreState>()
    }

    fn set_core_state(&self, value: &CoreState) -> StoreResult<()> {
        trace!("Setting core state {value:?}");
        self.put_typed(Self::CORE_STATE_KEY, value)
    }

    fn get_core_state(&self) -> StoreResult<Option<CoreState>> {
        trace!("Getting core state");
        self.get_typed(Self::CORE_STATE_KEY)
    }
}
