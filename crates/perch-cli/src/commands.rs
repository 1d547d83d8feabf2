use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use perch_core::{CacheTier, DynPlatform, table_name};
use perch_discord::DiscordPlatform;
use perch_resolver::UserResolver;
use perch_storage::{DynUserStore, FastCache, UserStore};
use tracing::{debug, warn};

use crate::cli::{ClearArgs, OutputFormat};
use crate::config::AppConfig;
use crate::output;

/// Stores, resolver and adapter wired from the loaded configuration.
pub struct Context {
    store: DynUserStore,
    resolver: UserResolver,
    platform: DynPlatform,
    refresh_wait: Duration,
}

impl Context {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let store: DynUserStore = perch_db_postgres::create_user_store(config.postgres.clone())
            .await
            .context("Failed to connect to PostgreSQL")?;
        let fast_cache = perch_cache_redis::create_fast_cache(&config.redis).await;
        debug!(fast_cache = fast_cache.backend_name(), "fast cache ready");

        let resolver = UserResolver::new(store.clone(), fast_cache, config.cache.clone());
        let platform: DynPlatform = Arc::new(DiscordPlatform::new(config.discord.clone()));

        Ok(Self {
            store,
            resolver,
            platform,
            refresh_wait: config.discord.request_timeout(),
        })
    }

    /// Gives detached refreshes a chance to finish before the process exits.
    async fn drain_refreshes(&self) {
        let deadline = tokio::time::Instant::now() + self.refresh_wait;
        while self.resolver.refreshes_in_flight() > 0 {
            if tokio::time::Instant::now() >= deadline {
                warn!("exiting with a background refresh still running");
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

pub async fn get(ctx: &Context, id: &str, format: OutputFormat) -> Result<()> {
    let resolved = ctx.resolver.resolve(id, &ctx.platform).await?;
    output::print_resolved(&resolved, format)?;
    ctx.drain_refreshes().await;
    Ok(())
}

pub async fn clear(ctx: &Context, args: &ClearArgs, format: OutputFormat) -> Result<()> {
    let tiers: Vec<CacheTier> = args.tiers.iter().copied().map(Into::into).collect();
    let outcome = ctx
        .resolver
        .clear_user(&args.id, &ctx.platform, &tiers)
        .await?;
    output::print_cleared(&args.id, &outcome, format)
}

pub async fn init(ctx: &Context) -> Result<()> {
    let name = ctx.platform.name();
    ctx.store
        .ensure_table(name)
        .await
        .with_context(|| format!("Failed to create table for {name}"))?;
    output::print_success(&format!("Table {} is ready", table_name(name)));
    Ok(())
}
