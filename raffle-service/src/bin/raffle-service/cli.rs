use clap::{Parser, Subcommand};
use raffle_core::foundation::RaffleId;
use raffle_core::infrastructure::config::{CONFIG_PATH_ENV, DATA_DIR_ENV};
use std::path::PathBuf;

/// Env key figment maps onto `oracle.rpc_url`.
const RPC_URL_ENV: &str = "RAFFLE_ORACLE__RPC_URL";

#[derive(Parser, Debug)]
#[command(name = "raffle-service")]
#[command(about = "Ledger-seeded raffle ranking service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override ledger JSON-RPC URL
    #[arg(short, long, global = true)]
    pub rpc_url: Option<String>,

    /// Log filters, e.g. `debug` or `info,root=warn` (defaults to the config value)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Also write rolling log files to this directory
    #[arg(long, global = true)]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drive the configured raffles until they finalize
    Run,
    /// Advance a single round of one raffle
    Advance {
        #[arg(long)]
        raffle: RaffleId,
    },
    /// Print the ranking and status of one raffle as JSON
    Results {
        #[arg(long)]
        raffle: RaffleId,
    },
    /// Load a raffle and its participants from a JSON file
    Import {
        #[arg(long)]
        file: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn apply_to_env(&self) {
        if let Some(config_path) = &self.config {
            std::env::set_var(CONFIG_PATH_ENV, config_path);
        }

        if let Some(data_dir) = &self.data_dir {
            std::env::set_var(DATA_DIR_ENV, data_dir);
        }

        if let Some(rpc_url) = &self.rpc_url {
            std::env::set_var(RPC_URL_ENV, rpc_url);
        }
    }
}
