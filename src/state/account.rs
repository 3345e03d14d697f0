use crate::store::StoreResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub public_key: String,
    pub create_time: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub balance: u64,
}

/// Balance locked for staking, backs the owner's delegate vote
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakedBalance {
    pub staked_balance: u64,
}

/// Allowance `owner` grants `spender`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCredit {
    pub owner: String,
    pub spender: String,
    pub limit: u64,
}

pub trait AccountStore {
    fn create_account_schema(&self) -> StoreResult<()>;

    fn set_account(&self, name: &str, value: &Account) -> StoreResult<()>;

    fn get_account(&self, name: &str) -> StoreResult<Option<Account>>;

    /// Lookup failures other than "not found" are reported, not folded into `false`
    fn is_account_exist(&self, name: &str) -> StoreResult<bool>;

    fn create_balance_schema(&self) -> StoreResult<()>;

    fn set_balance(&self, account_name: &str, value: &Balance) -> StoreResult<()>;

    fn get_balance(&self, account_name: &str) -> StoreResult<Option<Balance>>;

    fn create_staked_balance_schema(&self) -> StoreResult<()>;

    fn set_staked_balance(&self, account_name: &str, value: &StakedBalance) -> StoreResult<()>;

    fn get_staked_balance(&self, account_name: &str) -> StoreResult<Option<StakedBalance>>;

    fn create_transfer_credit_schema(&self) -> StoreResult<()>;

    /// Stored under `(value.owner, value.spender)`
    fn set_transfer_credit(&self, value: &TransferCredit) -> StoreResult<()>;

    fn get_transfer_credit(&self, owner: &str, spender: &str)
        -> StoreResult<Option<TransferCredit>>;

    /// Deleting an absent credit is a no-op
    fn delete_transfer_credit(&self, owner: &str, spender: &str) -> StoreResult<()>;
}
