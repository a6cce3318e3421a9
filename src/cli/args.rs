//! CLI argument definitions using clap
//!
//! Commands:
//! - medvault init --config <path>
//! - medvault start --config <path> [--ephemeral]
//! - medvault call --config <path>
//! - medvault compact --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// medvault - owner-gated medical record store
#[derive(Parser, Debug)]
#[command(name = "medvault")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./medvault.json")]
        config: PathBuf,
    },

    /// Serve requests from stdin, one JSON object per line
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./medvault.json")]
        config: PathBuf,

        /// Keep records in memory only; nothing is written to data_dir
        #[arg(long)]
        ephemeral: bool,
    },

    /// Handle a single request from stdin and exit
    Call {
        /// Path to configuration file
        #[arg(long, default_value = "./medvault.json")]
        config: PathBuf,
    },

    /// Rewrite the record log keeping only live records
    Compact {
        /// Path to configuration file
        #[arg(long, default_value = "./medvault.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
