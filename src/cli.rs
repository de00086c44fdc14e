//! Command-line interface built on clap.
//!
//! [`Cli`] carries the subcommands ([`Command`]: run, status, reset) and the
//! global flags (--config, --store, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;

/// wilt: a house plant for your wrist that dies if you leave it alone.
#[derive(Debug, Parser)]
#[command(name = "wilt", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Override where the plant's state is stored.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bring the plant up and let it decay on its wake timer.
    Run {
        /// Stop after this many wakes.
        #[arg(long)]
        max_wakes: Option<u32>,

        /// Don't draw anything; only log.
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },

    /// Show the persisted state and the image it maps to.
    Status,

    /// Forget the persisted state so the next run starts fresh.
    Reset,
}
