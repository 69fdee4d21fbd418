//! Configuration structures
//!
//! Every section deserializes with defaults so a config file only needs the
//! values that differ. Secrets usually arrive through the environment (see the
//! infra loader) rather than the file.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_URL, DEFAULT_CACHE_PATH, DEFAULT_DOWNLOAD_TIMEOUT_SECS,
    DEFAULT_PREFIX, DEFAULT_RATE_LIMIT_MS,
};
use crate::errors::{Result, SyncError};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Operator-chosen name segment identifying owned resources
    pub prefix: String,
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub retry: RetrySettings,
    pub rate_limit: RateLimitConfig,
    pub sources: SourcesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            retry: RetrySettings::default(),
            rate_limit: RateLimitConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl Config {
    /// Check the fields a pass cannot run without.
    ///
    /// # Errors
    /// Returns `SyncError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            return Err(SyncError::Config("prefix must not be empty".into()));
        }
        if self.api.api_token.trim().is_empty() {
            return Err(SyncError::Config("api token is required (CLOUDFLARE_API_TOKEN)".into()));
        }
        if self.api.account_id.trim().is_empty() {
            return Err(SyncError::Config("account id is required (CLOUDFLARE_ACCOUNT_ID)".into()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(SyncError::Config("api base url must not be empty".into()));
        }
        for (name, profile) in [("resource", &self.retry.resource), ("download", &self.retry.download)] {
            if profile.max_attempts == 0 {
                return Err(SyncError::Config(format!("retry.{name}.max_attempts must be at least 1")));
            }
        }
        Ok(())
    }
}

/// Remote gateway API access
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub account_id: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            account_id: String::new(),
            api_token: String::new(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

// Keep the token out of logs.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Local cache file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: PathBuf,
    /// Delete the cache file after a successful converge
    pub discard_after_run: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_CACHE_PATH), discard_after_run: false }
    }
}

/// Per-call-site retry profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Gateway API calls
    pub resource: RetryProfile,
    /// Block-list downloads
    pub download: RetryProfile,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { resource: RetryProfile::strict(), download: RetryProfile::lenient() }
    }
}

/// Attempt budget and backoff bounds for one call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryProfile {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_secs: u64,
}

impl RetryProfile {
    pub fn strict() -> Self {
        Self { max_attempts: 5, initial_delay_ms: 1000, max_delay_secs: 10 }
    }

    pub fn lenient() -> Self {
        Self { max_attempts: 15, initial_delay_ms: 1000, max_delay_secs: 30 }
    }
}

impl Default for RetryProfile {
    fn default() -> Self {
        Self::strict()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Minimum spacing between gated gateway calls
    pub min_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { min_interval_ms: DEFAULT_RATE_LIMIT_MS }
    }
}

/// Where the desired domain set comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub adlist_file: PathBuf,
    pub whitelist_file: PathBuf,
    /// Extra block-list URLs (`ADLIST_URLS`)
    pub adlist_urls: Vec<String>,
    /// Extra allow-list URLs (`WHITELIST_URLS`)
    pub whitelist_urls: Vec<String>,
    /// Inline block entries; replaces `dynamic_blacklist_file` when set
    pub dynamic_blacklist: Option<String>,
    /// Inline allow entries; replaces `dynamic_whitelist_file` when set
    pub dynamic_whitelist: Option<String>,
    pub dynamic_blacklist_file: PathBuf,
    pub dynamic_whitelist_file: PathBuf,
    /// Fallback copy of the first block-list; later ones get `.1`, `.2`, ...
    pub adlist_fallback: PathBuf,
    pub whitelist_fallback: PathBuf,
    pub download_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            adlist_file: PathBuf::from("./lists/adlist.ini"),
            whitelist_file: PathBuf::from("./lists/whitelist.ini"),
            adlist_urls: Vec::new(),
            whitelist_urls: Vec::new(),
            dynamic_blacklist: None,
            dynamic_whitelist: None,
            dynamic_blacklist_file: PathBuf::from("./lists/dynamic_blacklist.txt"),
            dynamic_whitelist_file: PathBuf::from("./lists/dynamic_whitelist.txt"),
            adlist_fallback: PathBuf::from("./lists/adlist_cache.txt"),
            whitelist_fallback: PathBuf::from("./lists/whitelist_cache.txt"),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}
