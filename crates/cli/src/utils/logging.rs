use blockgate_core::{ConvergeReport, DeletionFailure, TeardownReport};
use blockgate_domain::SyncError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::LogFormat;

/// Install the global subscriber; `RUST_LOG` overrides the `info` default.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // A second init (tests) is not an error worth surfacing.
    let _ = match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer().with_target(false)).try_init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json().flatten_event(true)).try_init(),
    };
}

/// Stable label of an error kind for structured logs.
#[inline]
pub fn error_label(error: &SyncError) -> &'static str {
    match error {
        SyncError::Network(_) => "network",
        SyncError::RateLimited(_) => "rate_limited",
        SyncError::Server { .. } => "server",
        SyncError::Client { .. } => "client",
        SyncError::Capacity(_) => "capacity",
        SyncError::CacheIo(_) => "cache_io",
        SyncError::Config(_) => "config",
        SyncError::Source(_) => "source",
        SyncError::Internal(_) => "internal",
    }
}

/// Summarize a converge pass.
pub fn log_converge_report(report: &ConvergeReport, failed_saves: usize) {
    log_failures(&report.orphan_failures);
    if failed_saves > 0 {
        warn!(failed_saves, "cache could not be saved after some mutations");
    }
    info!(desired = report.desired, mutations = report.mutations(), lists_in_use = report.lists_in_use, "run_finished");
}

/// Summarize a teardown pass.
pub fn log_teardown_report(report: &TeardownReport) {
    log_failures(&report.failures);
    info!(clean = report.is_clean(), "leave_finished");
}

fn log_failures(failures: &[DeletionFailure]) {
    for failure in failures {
        warn!(kind = ?failure.kind, id = %failure.id, name = %failure.name, error = %failure.message, "deletion_failed");
    }
}
