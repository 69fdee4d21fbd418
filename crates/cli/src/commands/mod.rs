//! Command implementations
//!
//! Each command loads the configuration, wires the infrastructure adapters
//! into the reconciliation service and runs one pass.

pub mod leave;
pub mod run;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use blockgate_common::resilience::MinIntervalGate;
use blockgate_core::{CacheStore, ReconcileService, SyncContext};
use blockgate_domain::{Config, SyncError};
use blockgate_infra::config::{load, retry_config};
use blockgate_infra::{GatewayClient, JsonFileCache};
use tracing::info;

use crate::{Cli, Commands};

/// Dispatch the parsed command line.
pub async fn execute(cli: &Cli) -> Result<()> {
    let config = load(cli.config.as_deref()).context("loading configuration")?;
    info!(prefix = %config.prefix, account = %config.api.account_id, "configuration loaded");

    match cli.command {
        Commands::Run => run::execute(&config).await,
        Commands::Leave => leave::execute(&config).await,
    }
}

/// Gateway adapters shared by both commands.
pub(crate) struct Session {
    pub service: ReconcileService,
    pub ctx: SyncContext,
}

impl Session {
    pub async fn open(config: &Config) -> Result<Self> {
        let gate = Arc::new(MinIntervalGate::new(Duration::from_millis(config.rate_limit.min_interval_ms)));
        let retry = retry_config(&config.retry.resource)?;
        let gateway = GatewayClient::new(&config.api, retry, gate).map_err(SyncError::from)?;
        let service = ReconcileService::new(Arc::new(gateway), &config.prefix);

        let store: Arc<dyn CacheStore> = Arc::new(JsonFileCache::new(&config.cache.path));
        let ctx = SyncContext::load(store).await;

        Ok(Self { service, ctx })
    }
}
