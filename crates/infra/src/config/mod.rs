//! Configuration loading
//!
//! File, environment and defaults merged into a validated
//! [`Config`](blockgate_domain::Config).

pub mod loader;

// Re-export commonly used items
pub use loader::{apply_env_overrides, load, load_from_file, probe_config_paths, retry_config};
