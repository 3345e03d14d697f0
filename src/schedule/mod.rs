//! Slot arithmetic and delegate lookup
//!
//! Slot `n` starts at `genesis_time + n * block_interval` and belongs to the
//! delegate at position `n % len` of the persisted [ScheduleDelegate].

pub mod election;

use crate::{
    constants::{PARTICIPATION_SCALE, PARTICIPATION_WINDOW},
    state::{ChainStore, CoreState, Delegate, DelegateStore, ScheduleDelegate},
    store::{StateStore, StoreError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, trace};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no delegate scheduled for slot {slot}, block production is halted")]
    NoSchedule { slot: u64 },
    #[error("core state missing, genesis not initialized")]
    MissingCoreState,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct DelegateScheduler {
    store: Arc<StateStore>,
    core_state: CoreState,
}

impl DelegateScheduler {
    pub fn new(store: Arc<StateStore>, core_state: CoreState) -> Self {
        Self { store, core_state }
    }

    /// Scheduler over the store's persisted protocol parameters
    pub fn load(store: Arc<StateStore>) -> Result<Self, ScheduleError> {
        let core_state = store
            .get_core_state()?
            .ok_or(ScheduleError::MissingCoreState)?;
        Ok(Self::new(store, core_state))
    }

    pub fn core_state(&self) -> &CoreState {
        &self.core_state
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    fn block_interval(&self) -> u64 {
        self.core_state.block_interval.max(1)
    }

    /// Slot containing `current`, times before genesis map to slot 0
    pub fn get_slot_at_time(&self, current: u64) -> u64 {
        current.saturating_sub(self.core_state.genesis_time) / self.block_interval()
    }

    /// Start time of `slot_num`
    pub fn get_slot_time(&self, slot_num: u64) -> u64 {
        self.core_state
            .genesis_time
            .saturating_add(slot_num.saturating_mul(self.block_interval()))
    }

    pub fn get_candidate_by_slot(&self, slot_num: u64) -> Result<String, ScheduleError> {
        trace!("Getting candidate for slot {slot_num}");
        self.store
            .get_schedule_delegate()?
            .as_ref()
            .and_then(|schedule| schedule.delegate_at(slot_num))
            .map(str::to_string)
            .ok_or(ScheduleError::NoSchedule { slot: slot_num })
    }

    pub fn get_candidate_at_time(&self, current: u64) -> Result<String, ScheduleError> {
        self.get_candidate_by_slot(self.get_slot_at_time(current))
    }

    /// Share of the last 64 slots which produced a block, scaled by 10000.
    /// Advisory only, an unreadable chain state reports 0.
    pub fn get_delegate_participation_rate(&self) -> u64 {
        match self.store.get_chain_state() {
            Ok(Some(chain_state)) => {
                PARTICIPATION_SCALE * chain_state.recent_slot_filled / PARTICIPATION_WINDOW
            }
            Ok(None) => 0,
            Err(e) => {
                debug!("Participation rate unavailable: {e}");
                0
            }
        }
    }

    /// Whether applying `block_num` ends the current term
    pub fn is_term_boundary(&self, block_num: u64) -> bool {
        let blocks_per_term = self.core_state.blocks_per_term;
        blocks_per_term > 0 && block_num > 0 && block_num % blocks_per_term == 0
    }

    /// Seed genesis state and the term 0 schedule on `store`, keeping
    /// whatever is already there
    pub fn init_genesis(
        store: Arc<StateStore>,
        core_state: &CoreState,
        delegates: &[Delegate],
    ) -> Result<Self, ScheduleError> {
        let core_state = store.init_genesis(core_state)?;
        let scheduler = Self::new(store, core_state);
        scheduler.init_genesis_schedule(delegates)?;
        Ok(scheduler)
    }

    /// Register `delegates` and elect the term 0 schedule, unless a schedule
    /// already exists
    pub fn init_genesis_schedule(
        &self,
        delegates: &[Delegate],
    ) -> Result<Option<ScheduleDelegate>, ScheduleError> {
        if self.store.get_schedule_delegate()?.is_some() || delegates.is_empty() {
            return Ok(None);
        }

        info!("Registering {} genesis delegates", delegates.len());
        for delegate in delegates {
            self.store.set_delegate(delegate)?;
        }
        self.schedule_next_term(0).map(Some)
    }

    /// Elect the delegates of `term` and persist their schedule.
    ///
    /// An empty election persists an empty schedule: every later
    /// [Self::get_candidate_by_slot] reports [ScheduleError::NoSchedule]
    /// until candidates register and a new election runs.
    pub fn schedule_next_term(&self, term: u64) -> Result<ScheduleDelegate, ScheduleError> {
        let delegates = self.elect_next_term_delegates()?;
        if delegates.is_empty() {
            error!("Term {term} elected no delegates, block production halts");
        } else {
            info!("Term {term} schedule: {delegates:?}");
        }

        let schedule = ScheduleDelegate { term, delegates };
        self.store.set_schedule_delegate(&schedule)?;
        Ok(schedule)
    }
}
