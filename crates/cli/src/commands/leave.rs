use anyhow::{bail, Context, Result};
use blockgate_domain::Config;

use super::Session;
use crate::utils::logging::log_teardown_report;

/// Delete every managed rule and list; fails if any deletion failed.
pub async fn execute(config: &Config) -> Result<()> {
    let Session { service, mut ctx } = Session::open(config).await?;
    let report = service.teardown(&mut ctx).await.context("removing managed resources")?;
    log_teardown_report(&report);

    if !report.is_clean() {
        bail!("{} deletions failed", report.failures.len());
    }
    Ok(())
}
