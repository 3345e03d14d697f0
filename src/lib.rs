pub mod apply;
pub mod config;
pub mod constants;
pub mod hash;
pub mod schedule;
pub mod state;
pub mod store;
pub mod transaction;

pub use apply::{Block, BlockApplier};
pub use schedule::DelegateScheduler;
pub use store::StateStore;
pub use transaction::{
    actor::{TransactionActor, TrxActorMailbox},
    pool::TransactionPool,
    Transaction,
};
