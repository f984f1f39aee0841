//! Command-line interface definitions.
//!
//! Defines the CLI structure for the fxpeer binary using `clap`. The CLI is
//! a diagnostic and inspection surface over the trade engine: validate
//! configuration, browse offers, follow an active trade.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Peer-to-peer currency exchange trade engine CLI
#[derive(Parser, Debug)]
#[command(name = "fxpeer")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, default_value = "fxpeer.toml")]
    pub config: PathBuf,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the fxpeer CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),

    /// List currently published offers
    Offers,

    /// Follow a trade until it reaches a terminal status
    Watch(WatchArgs),
}

/// Subcommands for `fxpeer check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config,
}

/// Arguments for the `watch` subcommand.
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Trade id to follow.
    pub trade_id: String,
}
