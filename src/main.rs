use clap::{Args, Parser, Subcommand};
use dpos_core::{
    config::NodeConfig,
    schedule::DelegateScheduler,
    state::{ChainStore, DelegateStore},
    store::StateStore,
};
use std::{
    path::PathBuf,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::info;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "dpos-node", author, version, about, long_about = Some("DPoS node core\n\n\
Inspect and initialize the chain state and delegate schedule"))]
struct Cli {
    #[command(subcommand)]
    command: NodeCommand,
}

#[derive(Subcommand, Debug)]
enum NodeCommand {
    /// Create the store schemas and seed genesis state
    Init(ConfigArgs),
    /// Print chain state, participation rate and schedule
    Status(ConfigArgs),
    /// Print the slot and scheduled delegate at a time
    Slot {
        #[command(flatten)]
        config: ConfigArgs,

        /// Unix time in seconds [default: now]
        #[arg(long)]
        time: Option<u64>,
    },
    /// Print the candidate ranking for the next term
    Elect(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Path to the node config (yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured database directory
    #[arg(long)]
    database_dir: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_file(path)?,
            None => NodeConfig::default(),
        };
        if let Some(database_dir) = &self.database_dir {
            config.database_dir = database_dir.clone();
        }
        Ok(config)
    }
}

impl NodeCommand {
    fn config_args(&self) -> &ConfigArgs {
        match self {
            Self::Init(args) | Self::Status(args) | Self::Elect(args) => args,
            Self::Slot { config, .. } => config,
        }
    }
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.command.config_args().load()?;

    let stdout_layer = tracing_subscriber::fmt::layer();
    tracing_subscriber::registry()
        .with(stdout_layer.with_filter(config.log_level()?))
        .init();

    // only `init` may create and seed a store
    let (store, scheduler) = match &cli.command {
        NodeCommand::Init(_) => {
            let store = Arc::new(StateStore::open(&config.database_dir)?);
            let scheduler = DelegateScheduler::init_genesis(
                store.clone(),
                &config.genesis,
                &config.genesis_delegates,
            )?;
            (store, scheduler)
        }
        _ => {
            let store = Arc::new(StateStore::open_existing(&config.database_dir)?);
            (store.clone(), DelegateScheduler::load(store)?)
        }
    };

    match cli.command {
        NodeCommand::Init(_) => {
            info!(
                "Initialized store at {} with schemas {:?}",
                store.db_path().display(),
                store.schemas()
            );
        }
        NodeCommand::Status(_) => {
            let chain_state = store.get_chain_state()?;
            println!("{chain_state:#?}");
            println!(
                "participation rate: {}",
                scheduler.get_delegate_participation_rate()
            );
            println!("schedule: {:#?}", store.get_schedule_delegate()?);
            println!("estimated keys: {:?}", store.estimate_num_keys()?);
        }
        NodeCommand::Slot { time, .. } => {
            let time = match time {
                Some(time) => time,
                None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
            };
            let slot = scheduler.get_slot_at_time(time);
            println!("slot {slot} starts at {}", scheduler.get_slot_time(slot));
            match scheduler.get_candidate_by_slot(slot) {
                Ok(delegate) => println!("delegate: {delegate}"),
                Err(e) => println!("{e}"),
            }
        }
        NodeCommand::Elect(_) => {
            let delegates_per_term = scheduler.core_state().delegates_per_term as usize;
            for (rank, (name, weight)) in scheduler.rank_candidates()?.into_iter().enumerate() {
                let marker = if rank < delegates_per_term { "*" } else { " " };
                println!("{marker} {:>3} {name} {weight}", rank + 1);
            }
        }
    }
    Ok(())
}
