use crate::store::StoreResult;
use serde::{Deserialize, Serialize};

/// Block-production candidate, reachable by account name and by sign key
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delegate {
    pub account_name: String,
    pub sign_key: String,
    pub location: String,
    pub description: String,
}

/// A voter's choice of delegate, weighted by the voter's staked balance
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateVotes {
    pub voter: String,
    pub delegate: String,
}

/// Slot order of the current term's delegates
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDelegate {
    pub term: u64,
    pub delegates: Vec<String>,
}

impl ScheduleDelegate {
    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }

    /// Delegate at `slot` modulo the schedule length
    pub fn delegate_at(&self, slot: u64) -> Option<&str> {
        if self.delegates.is_empty() {
            return None;
        }
        let idx = (slot % self.delegates.len() as u64) as usize;
        self.delegates.get(idx).map(String::as_str)
    }
}

pub trait DelegateStore {
    /// Creates the delegate records and the sign key index
    fn create_delegate_schema(&self) -> StoreResult<()>;

    /// Write `value` under its account name and keep the sign key index in
    /// step, both in one atomic write
    fn set_delegate(&self, value: &Delegate) -> StoreResult<()>;

    fn get_delegate_by_account_name(&self, name: &str) -> StoreResult<Option<Delegate>>;

    fn get_delegate_by_sign_key(&self, sign_key: &str) -> StoreResult<Option<Delegate>>;

    /// All registered delegates, ordered by account name
    fn get_all_delegates(&self) -> StoreResult<Vec<Delegate>>;

    fn create_delegate_votes_schema(&self) -> StoreResult<()>;

    fn set_delegate_votes(&self, voter: &str, value: &DelegateVotes) -> StoreResult<()>;

    fn get_delegate_votes(&self, voter: &str) -> StoreResult<Option<DelegateVotes>>;

    /// All vote records, ordered by voter
    fn get_all_delegate_votes(&self) -> StoreResult<Vec<DelegateVotes>>;

    fn create_schedule_delegate_schema(&self) -> StoreResult<()>;

    fn set_schedule_delegate(&self, value: &ScheduleDelegate) -> StoreResult<()>;

    fn get_schedule_delegate(&self) -> StoreResult<Option<ScheduleDelegate>>;
}
