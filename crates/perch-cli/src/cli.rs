use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use perch_core::CacheTier;

#[derive(Parser)]
#[command(name = "perch")]
#[command(about = "perch: tiered cache for platform users")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./perch.toml when present)
    #[arg(short, long, global = true, env = "PERCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides logging.level from the config)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a user through the cache tiers
    Get(GetArgs),
    /// Remove a user from the durable tiers
    Clear(ClearArgs),
    /// Create the platform's persistent table
    Init,
}

#[derive(clap::Args)]
pub struct GetArgs {
    /// Platform identity (Discord snowflake)
    pub id: String,
}

#[derive(clap::Args)]
pub struct ClearArgs {
    /// Platform identity (Discord snowflake)
    pub id: String,
    /// Tier to clear; repeat for several. Omit to clear all
    #[arg(long = "tier", value_enum)]
    pub tiers: Vec<TierArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    Persistent,
    FastCache,
}

impl From<TierArg> for CacheTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Persistent => CacheTier::Persistent,
            TierArg::FastCache => CacheTier::FastCache,
        }
    }
}
