//! Column family layout of the [StateStore](super::StateStore)
//!
//! Every entity lives in its own column family. Values are JSON, keys are:
//! - names:            utf8 bytes
//! - block numbers:    8 BE bytes
//! - hashes:           32 raw bytes
//! - transfer credits: `{owner}\0{spender}`
//! - singletons:       [FixedKeys](super::fixed_keys::FixedKeys)

use crate::state::{
    Account, Balance, BlockHistory, ChainState, CoreState, Delegate, DelegateVotes,
    ScheduleDelegate, StakedBalance, TransactionExpiration, TransactionHistory, TransferCredit,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// An entity type with a dedicated column family
pub trait StoredEntity: Serialize + DeserializeOwned {
    const COLUMN_FAMILY: &'static str;
}

/// Secondary index entry `sign key -> account name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SignKeyIndex {
    pub account_name: String,
}

macro_rules! stored_entity {
    ($($entity:ty => $cf:literal),* $(,)?) => {
        $(
            impl StoredEntity for $entity {
                const COLUMN_FAMILY: &'static str = $cf;
            }
        )*

        /// Names of all column families, in creation order
        pub const COLUMN_FAMILIES: &[&str] = &[$($cf),*];
    };
}

stored_entity! {
    ChainState => "chain-state",
    CoreState => "core-state",
    Account => "accounts",
    Balance => "balances",
    StakedBalance => "staked-balances",
    TransferCredit => "transfer-credits",
    Delegate => "delegates",
    SignKeyIndex => "delegate-sign-keys",
    DelegateVotes => "delegate-votes",
    ScheduleDelegate => "schedule-delegate",
    BlockHistory => "block-history",
    TransactionHistory => "transaction-history",
    TransactionExpiration => "transaction-expiration",
}

pub(crate) fn name_key(name: &str) -> Vec<u8> {
    name.as_bytes().to_vec()
}

pub(crate) fn block_num_key(block_num: u64) -> Vec<u8> {
    block_num.to_be_bytes().to_vec()
}

pub(crate) fn transfer_credit_key(owner: &str, spender: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner.len() + spender.len() + 1);
    key.extend_from_slice(owner.as_bytes());
    key.push(0);
    key.extend_from_slice(spender.as_bytes());
    key
}
