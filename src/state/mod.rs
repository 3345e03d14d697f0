//! Persisted chain-state entities and the store traits which read and write
//! them. [StateStore](crate::store::StateStore) implements every trait.

pub mod account;
pub mod chain;
pub mod delegate;
pub mod history;

pub use account::{Account, AccountStore, Balance, StakedBalance, TransferCredit};
pub use chain::{ChainState, ChainStore, CoreState};
pub use delegate::{Delegate, DelegateStore, DelegateVotes, ScheduleDelegate};
pub use history::{BlockHistory, HistoryStore, TransactionExpiration, TransactionHistory};
