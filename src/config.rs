use crate::{
    constants::*,
    state::{CoreState, Delegate},
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, level_filters::LevelFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub database_dir: PathBuf,
    pub log_level: String,

    /// Reply timeout of transaction actor requests
    pub mailbox_timeout_ms: u64,

    /// Protocol parameters seeded into a fresh store
    pub genesis: CoreState,

    /// Delegates registered and scheduled for term 0 of a fresh store
    pub genesis_delegates: Vec<Delegate>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            database_dir: PathBuf::from(DEFAULT_DATABASE_DIR),
            log_level: "info".to_string(),
            mailbox_timeout_ms: DEFAULT_MAILBOX_TIMEOUT_MS,
            genesis: CoreState::default(),
            genesis_delegates: vec![],
        }
    }
}

impl NodeConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let genesis = &self.genesis;
        if genesis.block_interval == 0 {
            return Err(ConfigError::Invalid("block_interval must be positive".into()));
        }
        if genesis.delegates_per_term == 0 {
            return Err(ConfigError::Invalid(
                "delegates_per_term must be positive".into(),
            ));
        }
        if genesis.blocks_per_term == 0 {
            return Err(ConfigError::Invalid("blocks_per_term must be positive".into()));
        }
        for delegate in &self.genesis_delegates {
            if delegate.account_name.is_empty() || delegate.sign_key.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "genesis delegate {delegate:?} needs an account name and sign key"
                )));
            }
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {}", self.log_level)))
    }

    pub fn mailbox_timeout(&self) -> Duration {
        Duration::from_millis(self.mailbox_timeout_ms)
    }
}
