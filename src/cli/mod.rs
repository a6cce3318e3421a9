//! CLI module for medvault
//!
//! Provides command-line interface for:
//! - init: Create directory structure
//! - start: Boot the store and serve stdin requests
//! - call: One-shot request
//! - compact: Rewrite the record log

mod args;
mod commands;
mod config;
mod errors;
mod io;
mod logging;

pub use args::{Cli, Command};
pub use commands::{boot, call, compact, init, run, run_command, serve, start, CliHandler};
pub use config::Config;
pub use errors::{CliError, CliResult};
pub use io::{read_request, read_requests, write_json, write_response};
pub use logging::{env_filter, init_tracing};
