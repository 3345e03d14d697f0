use super::{
    column_families::{name_key, SignKeyIndex},
    fixed_keys::FixedKeys,
    StateBatch, StateStore, StoreResult,
};
use crate::state::{Delegate, DelegateStore, DelegateVotes, ScheduleDelegate};
use tracing::{trace, warn};

impl DelegateStore for StateStore {
    fn create_delegate_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<Delegate>()?;
        self.create_entity_schema::<SignKeyIndex>()
    }

    fn set_delegate(&self, value: &Delegate) -> StoreResult<()> {
        trace!(
            "Setting delegate {} with sign key {}",
            value.account_name,
            value.sign_key
        );
        let mut batch = StateBatch::new();
        self.stage_delegate(&mut batch, value)?;
        self.commit(batch)
    }

    fn get_delegate_by_account_name(&self, name: &str) -> StoreResult<Option<Delegate>> {
        trace!("Getting delegate {name}");
        self.get_typed(&name_key(name))
    }

    fn get_delegate_by_sign_key(&self, sign_key: &str) -> StoreResult<Option<Delegate>> {
        trace!("Getting delegate by sign key {sign_key}");
        let Some(name) = self.sign_key_owner(sign_key)? else {
            return Ok(None);
        };

        match self.get_delegate_by_account_name(&name)? {
            Some(delegate) if delegate.sign_key == sign_key => Ok(Some(delegate)),
            Some(delegate) => {
                warn!(
                    "Stale sign key index {sign_key} -> {name}, delegate now signs with {}",
                    delegate.sign_key
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn get_all_delegates(&self) -> StoreResult<Vec<Delegate>> {
        trace!("Getting all delegates");
        self.get_all_typed()
    }

    fn create_delegate_votes_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<DelegateVotes>()
    }

    fn set_delegate_votes(&self, voter: &str, value: &DelegateVotes) -> StoreResult<()> {
        trace!("Setting vote of {voter} for {}", value.delegate);
        self.put_typed(&name_key(voter), value)
    }

    fn get_delegate_votes(&self, voter: &str) -> StoreResult<Option<DelegateVotes>> {
        trace!("Getting vote of {voter}");
        self.get_typed(&name_key(voter))
    }

    fn get_all_delegate_votes(&self) -> StoreResult<Vec<DelegateVotes>> {
        trace!("Getting all delegate votes");
        self.get_all_typed()
    }

    fn create_schedule_delegate_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<ScheduleDelegate>()
    }

    fn set_schedule_delegate(&self, value: &ScheduleDelegate) -> StoreResult<()> {
        trace!(
            "Setting term {} schedule of {} delegates",
            value.term,
            value.delegates.len()
        );
        self.put_typed(Self::SCHEDULE_DELEGATE_KEY, value)
    }

    fn get_schedule_delegate(&self) -> StoreResult<Option<ScheduleDelegate>> {
        trace!("Getting schedule delegate");
        self.get_typed(Self::SCHEDULE_DELEGATE_KEY)
    }
}
