//! CLI commands and handlers
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::app::{AppCfg, Overrides, Pipeline};
use crate::config::Config;
use crate::domain::sandwich::bracket_count;
use crate::shared::errors::AppError;

#[derive(Parser, Debug)]
#[command(name = "sandwatch")]
#[command(version, about = "Detect Solana sandwich attacks and correlate them with validator stake")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to TOML config file (optional)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// RPC endpoint URL
    #[arg(long, global = true, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Address whose transaction history is scanned
    #[arg(long, global = true, env = "SANDWICHER_ADDRESS")]
    pub sandwicher: Option<String>,

    /// Maximum number of successful signatures to collect
    #[arg(long, global = true, env = "MAX_TRANSACTIONS")]
    pub max_signatures: Option<usize>,

    /// Directory holding the stage artifacts
    #[arg(long, global = true, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            rpc_url: self.rpc_url.clone(),
            sandwicher: self.sandwicher.clone(),
            max_signatures: self.max_signatures,
            data_dir: self.data_dir.clone(),
        }
    }

    /// Resolve flags and environment over the config file and defaults
    pub fn resolve(&self) -> anyhow::Result<AppCfg> {
        let base = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        Ok(AppCfg::from_config(base, self.overrides())?)
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run every stage from signature collection to the validator report
    Run,
    /// Collect the sandwicher's successful signatures
    Collect,
    /// Detect sandwiches among the collected signatures
    Detect,
    /// Resolve the leader of every sandwiched slot
    Leaders,
    /// Correlate sandwich leaders with delegated stake
    Analyze,
    /// Print the resolved configuration
    Config,
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, cfg: AppCfg) -> Result<(), AppError> {
        let pipeline = match command {
            Commands::Config => {
                println!("{}", cfg.to_toml()?);
                return Ok(());
            }
            _ => Pipeline::connect(cfg)?,
        };

        match command {
            Commands::Run => {
                if let Some(analysis) = pipeline.run().await? {
                    info!("✅ Analysis complete: {} validators reported", analysis.validator_details.len());
                }
            }
            Commands::Collect => {
                let signatures = pipeline.collect().await?;
                info!("✅ Collected {} signatures", signatures.len());
            }
            Commands::Detect => {
                let sandwiches = pipeline.detect_saved().await?;
                info!("✅ Found {} sandwiches", bracket_count(&sandwiches));
            }
            Commands::Leaders => {
                let leaders = pipeline.resolve_saved().await?;
                info!("✅ Stored leaders for {} slots", leaders.len());
            }
            Commands::Analyze => {
                if let Some(analysis) = pipeline.analyze_saved().await? {
                    info!("✅ Analysis complete: {} validators reported", analysis.validator_details.len());
                }
            }
            Commands::Config => {}
        }
        Ok(())
    }
}
