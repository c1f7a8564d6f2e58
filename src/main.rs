use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sandwatch::application::{Cli, CommandExecutor};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let default_level = if args.global.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Priority: CLI args > environment > config file > defaults
    let app_cfg = args.global.resolve()?;

    CommandExecutor::execute(args.command, app_cfg).await?;
    Ok(())
}
