use super::{
    column_families::{name_key, transfer_credit_key},
    StateStore, StoreResult,
};
use crate::state::{Account, AccountStore, Balance, StakedBalance, TransferCredit};
use tracing::trace;

impl AccountStore for StateStore {
    fn create_account_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<Account>()
    }

    fn set_account(&self, name: &str, value: &Account) -> StoreResult<()> {
        trace!("Setting account {name}");
        self.put_typed(&name_key(name), value)
    }

    fn get_account(&self, name: &str) -> StoreResult<Option<Account>> {
        trace!("Getting account {name}");
        self.get_typed(&name_key(name))
    }

    fn is_account_exist(&self, name: &str) -> StoreResult<bool> {
        Ok(self.get_account(name)?.is_some())
    }

    fn create_balance_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<Balance>()
    }

    fn set_balance(&self, account_name: &str, value: &Balance) -> StoreResult<()> {
        trace!("Setting balance of {account_name} to {}", value.balance);
        self.put_typed(&name_key(account_name), value)
    }

    fn get_balance(&self, account_name: &str) -> StoreResult<Option<Balance>> {
        trace!("Getting balance of {account_name}");
        self.get_typed(&name_key(account_name))
    }

    fn create_staked_balance_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<StakedBalance>()
    }

    fn set_staked_balance(&self, account_name: &str, value: &StakedBalance) -> StoreResult<()> {
        trace!(
            "Setting staked balance of {account_name} to {}",
            value.staked_balance
        );
        self.put_typed(&name_key(account_name), value)
    }

    fn get_staked_balance(&self, account_name: &str) -> StoreResult<Option<StakedBalance>> {
        trace!("Getting staked balance of {account_name}");
        self.get_typed(&name_key(account_name))
    }

    fn create_transfer_credit_schema(&self) -> StoreResult<()> {
        self.create_entity_schema::<TransferCredit>()
    }

    fn set_transfer_credit(&self, value: &TransferCredit) -> StoreResult<()> {
        trace!(
            "Setting transfer credit {} -> {}: {}",
            value.owner,
            value.spender,
            value.limit
        );
        self.put_typed(&transfer_credit_key(&value.owner, &value.spender), value)
    }

    fn get_transfer_credit(
        &self,
        owner: &str,
        spender: &str,
    ) -> StoreResult<Option<TransferCredit>> {
        trace!("Getting transfer credit {owner} -> {spender}");
        self.get_typed(&transfer_credit_key(owner, spender))
    }

    fn delete_transfer_credit(&self, owner: &str, spender: &str) -> StoreResult<()> {
        trace!("Deleting transfer credit {owner} -> {spender}");
        self.delete_typed::<TransferCredit>(&transfer_credit_key(owner, spender))
    }
}
