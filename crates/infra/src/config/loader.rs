//! Configuration loader
//!
//! ## Loading Strategy
//! 1. An explicit path (the `--config` flag), else `BLOCKGATE_CONFIG`
//! 2. Otherwise the first existing file among the probed paths
//! 3. Defaults when no file exists at all
//! 4. Environment overrides on top, then validation
//!
//! ## Environment Variables
//! - `CLOUDFLARE_API_TOKEN`: Gateway API token
//! - `CLOUDFLARE_ACCOUNT_ID`: Gateway account id
//! - `BLOCKGATE_PREFIX`: Name prefix of managed lists and the rule
//! - `BLOCKGATE_API_URL`: API base URL
//! - `BLOCKGATE_CACHE_PATH`: Local cache file
//! - `BLOCKGATE_RATE_LIMIT_MS`: Minimum spacing of gated calls
//! - `GITHUB_ACTIONS`: `true` discards the cache after a successful run
//! - `ADLIST_URLS` / `WHITELIST_URLS`: Whitespace-separated extra list URLs
//! - `DYNAMIC_BLACKLIST` / `DYNAMIC_WHITELIST`: Inline list contents
//!
//! ## File Locations
//! Probed in the current working directory, in order: `blockgate.toml`,
//! `blockgate.json`, `config.toml`, `config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use blockgate_common::resilience::{RetryConfig, RetryError};
use blockgate_domain::{Config, Result, RetryProfile, SyncError};

use crate::errors::InfraError;
use crate::sources::url_list::split_urls;

const CONFIG_ENV: &str = "BLOCKGATE_CONFIG";
const PROBED_FILES: [&str; 4] = ["blockgate.toml", "blockgate.json", "config.toml", "config.json"];

/// Load, override and validate the configuration.
///
/// # Errors
/// Returns `SyncError::Config` if:
/// - The explicit or `BLOCKGATE_CONFIG` file does not exist
/// - File format is invalid
/// - An override has an invalid value
/// - Validation fails (for example a missing API token)
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let explicit = explicit.map(Path::to_path_buf).or_else(|| env_value(CONFIG_ENV).map(PathBuf::from));

    let mut config = match explicit {
        Some(path) => load_from_file(&path)?,
        None => match probe_config_paths() {
            Some(path) => load_from_file(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// Supports both JSON and TOML formats (detected by file extension).
/// Missing sections and fields take their defaults.
///
/// # Errors
/// Returns `SyncError::Config` if the file cannot be read or parsed.
pub fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(SyncError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| SyncError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    let parsed: std::result::Result<Config, InfraError> = match extension {
        "toml" => toml::from_str(contents).map_err(InfraError::from),
        "json" => serde_json::from_str(contents).map_err(InfraError::from),
        _ => return Err(SyncError::Config(format!("Unsupported config format: {}", extension))),
    };
    parsed.map_err(SyncError::from)
}

/// The first probed config file that exists, if any.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    PROBED_FILES.iter().map(|name| cwd.join(name)).find(|path| path.exists())
}

/// Overlay environment variables on a loaded configuration.
///
/// Empty variables are ignored. URL lists are appended to the configured ones.
///
/// # Errors
/// Returns `SyncError::Config` if `BLOCKGATE_RATE_LIMIT_MS` is not a number.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(token) = env_value("CLOUDFLARE_API_TOKEN") {
        config.api.api_token = token;
    }
    if let Some(account) = env_value("CLOUDFLARE_ACCOUNT_ID") {
        config.api.account_id = account;
    }
    if let Some(prefix) = env_value("BLOCKGATE_PREFIX") {
        config.prefix = prefix;
    }
    if let Some(url) = env_value("BLOCKGATE_API_URL") {
        config.api.base_url = url;
    }
    if let Some(path) = env_value("BLOCKGATE_CACHE_PATH") {
        config.cache.path = PathBuf::from(path);
    }
    if let Some(interval) = env_value("BLOCKGATE_RATE_LIMIT_MS") {
        config.rate_limit.min_interval_ms = interval.trim().parse::<u64>().map_err(|e| {
            SyncError::Config(format!("Invalid BLOCKGATE_RATE_LIMIT_MS {interval:?}: {e}"))
        })?;
    }
    if env_value("GITHUB_ACTIONS").is_some_and(|value| value == "true") {
        config.cache.discard_after_run = true;
    }
    if let Some(urls) = env_value("ADLIST_URLS") {
        config.sources.adlist_urls.extend(split_urls(&urls));
    }
    if let Some(urls) = env_value("WHITELIST_URLS") {
        config.sources.whitelist_urls.extend(split_urls(&urls));
    }
    if let Some(content) = env_value("DYNAMIC_BLACKLIST") {
        config.sources.dynamic_blacklist = Some(content);
    }
    if let Some(content) = env_value("DYNAMIC_WHITELIST") {
        config.sources.dynamic_whitelist = Some(content);
    }
    Ok(())
}

/// Exponential backoff with full jitter bounded by `profile`.
///
/// # Errors
/// Returns `SyncError::Config` if the profile yields an invalid retry config.
pub fn retry_config(profile: &RetryProfile) -> Result<RetryConfig> {
    let initial = Duration::from_millis(profile.initial_delay_ms);
    let max = Duration::from_secs(profile.max_delay_secs).max(initial);
    RetryConfig::builder()
        .max_attempts(profile.max_attempts)
        .exponential_backoff(initial, 2.0, max)
        .full_jitter()
        .unlimited_time()
        .build()
        .map_err(|e| match e {
            RetryError::InvalidConfiguration { message } => SyncError::Config(format!("Invalid retry profile: {message}")),
            _ => SyncError::Config("Invalid retry profile".into()),
        })
}

/// Non-empty environment variable
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
