//! This module contains the [StateStore], a typed facade over RocksDB, and
//! its implementations of the store traits in [crate::state]

// helpers
pub mod column_families;
pub mod fixed_keys;

// impls
pub mod account_store_impl;
pub mod chain_store_impl;
pub mod delegate_store_impl;
pub mod history_store_impl;

use self::{
    column_families::{SignKeyIndex, StoredEntity, COLUMN_FAMILIES},
    fixed_keys::FixedKeys,
};
use crate::state::{
    AccountStore, ChainState, ChainStore, CoreState, Delegate, DelegateStore, HistoryStore,
};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch, DEFAULT_COLUMN_FAMILY_NAME,
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, info, trace};

type Database = DBWithThreadMode<MultiThreaded>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rocksdb::Error),
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("missing column family {0}, schema not created")]
    MissingSchema(&'static str),
    #[error("sign key {sign_key} already belongs to delegate {owner}")]
    SignKeyConflict { sign_key: String, owner: String },
    #[error("no store at {0}")]
    MissingStore(PathBuf),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug)]
pub struct StateStore {
    pub db_path: PathBuf,
    database: Database,
}

/// Writes staged for one atomic [StateStore::commit]
#[derive(Debug, Default)]
pub struct StateBatch {
    ops: Vec<BatchOp>,

    // staged delegate state, consulted before the db while staging
    delegates: HashMap<String, Delegate>,
    sign_key_owners: HashMap<String, Option<String>>,
}

#[derive(Debug)]
enum BatchOp {
    Put {
        cf: &'static str,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Delete {
        cf: &'static str,
        key: Vec<u8>,
    },
}

impl FixedKeys for StateStore {}

impl StateStore {
    /// Opens (or creates) the store at `path` and ensures every schema exists
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with(path, true)
    }

    /// Opens the store at `path`, failing with [StoreError::MissingStore]
    /// instead of creating one
    pub fn open_existing(path: &Path) -> StoreResult<Self> {
        if !Self::exists_at(path) {
            return Err(StoreError::MissingStore(path.into()));
        }
        Self::open_with(path, false)
    }

    /// Whether a database has been created at `path`
    pub fn exists_at(path: &Path) -> bool {
        path.join("CURRENT").is_file()
    }

    fn open_with(path: &Path, create_if_missing: bool) -> StoreResult<Self> {
        let mut database_opts = Options::default();
        database_opts.create_missing_column_families(true);
        database_opts.create_if_missing(create_if_missing);

        // a fresh path has no column families to list yet
        let existing = if Self::exists_at(path) {
            Database::list_cf(&database_opts, path)?
        } else {
            vec![DEFAULT_COLUMN_FAMILY_NAME.to_string()]
        };
        let descriptors: Vec<ColumnFamilyDescriptor> = existing
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Self::cf_options()))
            .collect();

        let database = Database::open_cf_descriptors(&database_opts, path, descriptors)?;
        let store = Self {
            db_path: path.into(),
            database,
        };

        store.create_schemas()?;
        info!("Opened state store at {}", path.display());
        Ok(store)
    }

    fn cf_options() -> Options {
        let mut cf_opts = Options::default();
        cf_opts.set_max_write_buffer_number(16);
        cf_opts
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Create the column family of every entity, idempotent
    pub fn create_schemas(&self) -> StoreResult<()> {
        self.create_chain_state_schema()?;
        self.create_core_state_schema()?;

        self.create_account_schema()?;
        self.create_balance_schema()?;
        self.create_staked_balance_schema()?;
        self.create_transfer_credit_schema()?;

        self.create_delegate_schema()?;
        self.create_delegate_votes_schema()?;
        self.create_schedule_delegate_schema()?;

        self.create_block_history_schema()?;
        self.create_transaction_history_schema()?;
        self.create_transaction_expiration_schema()
    }

    /// Names of the column families present in the open database
    pub fn schemas(&self) -> Vec<&'static str> {
        COLUMN_FAMILIES
            .iter()
            .copied()
            .filter(|cf| self.database.cf_handle(cf).is_some())
            .collect()
    }

    pub(crate) fn create_entity_schema<T: StoredEntity>(&self) -> StoreResult<()> {
        self.create_schema(T::COLUMN_FAMILY)
    }

    fn create_schema(&self, cf: &str) -> StoreResult<()> {
        if self.database.cf_handle(cf).is_none() {
            debug!("Creating column family {cf}");
            self.database.create_cf(cf, &Self::cf_options())?;
        }
        Ok(())
    }

    /// Seed the singletons of a fresh chain, existing values are kept.
    /// Returns the core state in effect.
    pub fn init_genesis(&self, core_state: &CoreState) -> StoreResult<CoreState> {
        let core_state = match self.get_core_state()? {
            Some(existing) => existing,
            None => {
                info!("Seeding genesis core state {core_state:?}");
                self.set_core_state(core_state)?;
                core_state.clone()
            }
        };

        if self.get_chain_state()?.is_none() {
            info!("Seeding genesis chain state");
            self.set_chain_state(&ChainState::genesis(core_state.genesis_time))?;
        }
        Ok(core_state)
    }

    /// Apply every staged write of `batch` in one atomic write
    pub fn commit(&self, batch: StateBatch) -> StoreResult<()> {
        trace!("Committing batch of {} writes", batch.ops.len());

        let mut write_batch = WriteBatch::default();
        for op in batch.ops {
            match op {
                BatchOp::Put { cf, key, value } => {
                    write_batch.put_cf(&self.cf_handle(cf)?, key, value)
                }
                BatchOp::Delete { cf, key } => write_batch.delete_cf(&self.cf_handle(cf)?, key),
            }
        }
        self.database.write(write_batch)?;
        Ok(())
    }

    /// Stage `delegate` along with its sign key index maintenance
    pub fn stage_delegate(&self, batch: &mut StateBatch, delegate: &Delegate) -> StoreResult<()> {
        let name = &delegate.account_name;
        let previous = match batch.delegates.get(name) {
            Some(staged) => Some(staged.clone()),
            None => self.get_typed::<Delegate>(name.as_bytes())?,
        };

        let owner = match batch.sign_key_owners.get(&delegate.sign_key) {
            Some(staged) => staged.clone(),
            None => self.sign_key_owner(&delegate.sign_key)?,
        };
        if let Some(owner) = owner {
            if &owner != name {
                return Err(StoreError::SignKeyConflict {
                    sign_key: delegate.sign_key.clone(),
                    owner,
                });
            }
        }

        if let Some(previous) = previous {
            if previous.sign_key != delegate.sign_key {
                trace!(
                    "Delegate {name} sign key {} -> {}",
                    previous.sign_key,
                    delegate.sign_key
                );
                batch.delete::<SignKeyIndex>(previous.sign_key.as_bytes().to_vec());
                batch.sign_key_owners.insert(previous.sign_key, None);
            }
        }

        batch.put(name.as_bytes().to_vec(), delegate)?;
        batch.put(
            delegate.sign_key.as_bytes().to_vec(),
            &SignKeyIndex {
                account_name: name.clone(),
            },
        )?;
        batch.delegates.insert(name.clone(), delegate.clone());
        batch
            .sign_key_owners
            .insert(delegate.sign_key.clone(), Some(name.clone()));
        Ok(())
    }

    pub(crate) fn sign_key_owner(&self, sign_key: &str) -> StoreResult<Option<String>> {
        Ok(self
            .get_typed::<SignKeyIndex>(sign_key.as_bytes())?
            .map(|index| index.account_name))
    }

    pub fn estimate_num_keys(&self) -> StoreResult<Option<u64>> {
        Ok(self
            .database
            .property_int_value(rocksdb::properties::ESTIMATE_NUM_KEYS)?)
    }

    ////////////////////
    // typed helpers  //
    ////////////////////

    fn cf_handle(&self, cf: &'static str) -> StoreResult<Arc<BoundColumnFamily<'_>>> {
        self.database
            .cf_handle(cf)
            .ok_or(StoreError::MissingSchema(cf))
    }

    pub(crate) fn get_typed<T: StoredEntity>(&self, key: &[u8]) -> StoreResult<Option<T>> {
        let cf = self.cf_handle(T::COLUMN_FAMILY)?;
        match self.database.get_pinned_cf(&cf, key)? {
            None => Ok(None),
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        }
    }

    pub(crate) fn put_typed<T: StoredEntity>(&self, key: &[u8], value: &T) -> StoreResult<()> {
        let cf = self.cf_handle(T::COLUMN_FAMILY)?;
        let value = serde_json::to_vec(value)?;
        self.database.put_cf(&cf, key, value)?;
        Ok(())
    }

    pub(crate) fn delete_typed<T: StoredEntity>(&self, key: &[u8]) -> StoreResult<()> {
        let cf = self.cf_handle(T::COLUMN_FAMILY)?;
        self.database.delete_cf(&cf, key)?;
        Ok(())
    }

    /// All values of an entity, in key order
    pub(crate) fn get_all_typed<T: StoredEntity>(&self) -> StoreResult<Vec<T>> {
        let cf = self.cf_handle(T::COLUMN_FAMILY)?;
        let mut values = vec![];
        for entry in self.database.iterator_cf(&cf, IteratorMode::Start) {
            let (_, bytes) = entry?;
            values.push(serde_json::from_slice(&bytes)?);
        }
        Ok(values)
    }
}

impl StateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: StoredEntity>(&mut self, key: Vec<u8>, value: &T) -> StoreResult<()> {
        self.ops.push(BatchOp::Put {
            cf: T::COLUMN_FAMILY,
            key,
            value: serde_json::to_vec(value)?,
        });
        Ok(())
    }

    pub fn delete<T: StoredEntity>(&mut self, key: Vec<u8>) {
        self.ops.push(BatchOp::Delete {
            cf: T::COLUMN_FAMILY,
            key,
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
