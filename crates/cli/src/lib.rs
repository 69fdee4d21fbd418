//! # blockgate-cli
//!
//! Command-line entry point that converges a DNS gateway's managed block
//! lists and rule to the configured block lists.
//!
//! ## Commands
//!
//! - `blockgate run` - Build the desired domain set and converge the gateway
//! - `blockgate leave` - Delete every managed rule and list
//!
//! ## Exit codes
//!
//! `0` success, `1` operational failure, `2` capacity exceeded, `3`
//! configuration error.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod commands;
pub mod utils;

use std::path::PathBuf;

use blockgate_domain::SyncError;
use clap::{Parser, Subcommand};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CAPACITY: u8 = 2;
pub const EXIT_CONFIG: u8 = 3;

/// Converge a DNS gateway's block lists to a desired domain set.
#[derive(Debug, Parser)]
#[command(name = "blockgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (TOML or JSON); defaults to `BLOCKGATE_CONFIG` or a probed path.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Converge the gateway to the configured block lists.
    Run,
    /// Remove every managed rule and list.
    Leave,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.chain().find_map(|cause| cause.downcast_ref::<SyncError>()) {
        Some(sync) if sync.is_capacity() => EXIT_CAPACITY,
        Some(sync) if sync.is_config() => EXIT_CONFIG,
        _ => EXIT_FAILURE,
    }
}
