mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::{Result, anyhow};
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    observability::init_tracing_with_level(cli.log_level.as_deref().unwrap_or("warn"));

    let cfg = config::loader::load_config(cli.config.as_deref())
        .map_err(|e| anyhow!("Failed to load configuration: {e}"))?;
    if cli.log_level.is_none() {
        observability::apply_logging_level(&cfg.logging.level);
    }

    let format = cli.format.unwrap_or_default();
    let ctx = commands::Context::connect(&cfg).await?;

    match &cli.command {
        Commands::Get(args) => commands::get(&ctx, &args.id, format).await?,
        Commands::Clear(args) => commands::clear(&ctx, args, format).await?,
        Commands::Init => commands::init(&ctx).await?,
    }

    Ok(())
}
