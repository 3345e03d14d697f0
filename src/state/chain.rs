use crate::{
    constants::*,
    hash::BlockHash,
    store::StoreResult,
};
use serde::{Deserialize, Serialize};

/// Dynamic chain metrics, rewritten once per applied block
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    pub head_block_num: u64,
    pub head_block_hash: BlockHash,
    pub head_block_time: u64,
    pub head_block_delegate: String,
    pub current_term: u64,
    pub current_absolute_slot: u64,

    /// Bit `i` is set if the slot `i` slots before the head slot was filled
    pub recent_slot_bitmap: u64,

    /// Number of filled slots among the last [PARTICIPATION_WINDOW]
    pub recent_slot_filled: u64,
}

/// Protocol parameters, seeded at genesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreState {
    /// Unix time (seconds) of slot 0
    pub genesis_time: u64,

    /// Seconds per slot
    pub block_interval: u64,
    pub delegates_per_term: u32,
    pub blocks_per_term: u64,

    /// Blocks past `ref_block_num` during which a transaction stays includable
    pub max_trx_lifetime: u64,
}

impl ChainState {
    /// Genesis counts as a fully produced window
    pub fn genesis(genesis_time: u64) -> Self {
        Self {
            head_block_time: genesis_time,
            recent_slot_bitmap: u64::MAX,
            recent_slot_filled: PARTICIPATION_WINDOW,
            ..Default::default()
        }
    }

    /// Mark `slot` as filled, every slot between the head slot and `slot`
    /// as missed
    pub fn record_filled_slot(&mut self, slot: u64) {
        let shift = slot.saturating_sub(self.current_absolute_slot).max(1);
        self.recent_slot_bitmap = if shift >= PARTICIPATION_WINDOW {
            1
        } else {
            (self.recent_slot_bitmap << shift) | 1
        };
        self.recent_slot_filled = self.recent_slot_bitmap.count_ones() as u64;
        self.current_absolute_slot = slot;
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self {
            genesis_time: 0,
            block_interval: DEFAULT_BLOCK_INTERVAL,
            delegates_per_term: DEFAULT_DELEGATES_PER_TERM,
            blocks_per_term: DEFAULT_DELEGATES_PER_TERM as u64 * DEFAULT_ROUNDS_PER_TERM,
            max_trx_lifetime: DEFAULT_MAX_TRX_LIFETIME,
        }
    }
}

pub trait ChainStore {
    fn create_chain_state_schema(&self) -> StoreResult<()>;

    fn set_chain_state(&self, value: &ChainState) -> StoreResult<()>;

    fn get_chain_state(&self) -> StoreResult<Option<ChainState>>;

    fn create_core_state_schema(&self) -> StoreResult<()>;

    fn set_core_state(&self, value: &CoreState) -> StoreResult<()>;

    fn get_core_state(&self) -> StoreResult<Option<CoreState>>;
}
