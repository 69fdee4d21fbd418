use std::time::Duration;

use anyhow::{Context, Result};
use blockgate_core::DomainSource;
use blockgate_domain::{Config, SyncError};
use blockgate_infra::config::retry_config;
use blockgate_infra::{Downloader, ListSources};
use tracing::info;

use super::Session;
use crate::utils::logging::log_converge_report;

/// Build the desired set and converge the gateway to it.
pub async fn execute(config: &Config) -> Result<()> {
    let downloader = Downloader::new(
        Duration::from_secs(config.sources.download_timeout_secs),
        retry_config(&config.retry.download)?,
    )
    .map_err(SyncError::from)?;
    let sources = ListSources::new(config.sources.clone(), downloader);

    let desired = sources.desired_domains().await.context("building desired domain set")?;

    let Session { service, mut ctx } = Session::open(config).await?;
    let report = service.converge(&desired, &mut ctx).await.context("converging gateway lists")?;
    log_converge_report(&report, ctx.failed_saves());

    if config.cache.discard_after_run {
        ctx.discard().await;
        info!("cache discarded after run");
    }
    Ok(())
}
