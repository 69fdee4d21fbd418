//! Capacity constants
//!
//! Limits of the remote gateway's free tier plus the retry bounds the client
//! uses against it.

/// Maximum number of domains a single list can hold.
pub const MAX_LIST_ITEMS: usize = 1000;

/// Maximum number of managed lists (two below the account limit of 300).
pub const MAX_LISTS: usize = 298;

/// Absolute ceiling on the desired domain set.
pub const MAX_DOMAINS: usize = MAX_LISTS * MAX_LIST_ITEMS;

/// Attempts `update_list` makes when the remote reports stale removals.
pub const NOT_FOUND_RETRY_ATTEMPTS: u32 = 3;

/// Redirect hops followed before a request is abandoned.
pub const MAX_REDIRECTS: usize = 10;

// Remote resource descriptions
pub const LIST_DESCRIPTION: &str = "Ads & Tracking Domains";
pub const RULE_DESCRIPTION: &str = "Block Ads & Tracking";
pub const RULE_NAME_SUFFIX: &str = "Block Ads";

// Defaults
pub const DEFAULT_PREFIX: &str = "Blockgate";
pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1000;
pub const DEFAULT_CACHE_PATH: &str = "./lists/cache.json";
