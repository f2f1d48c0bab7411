//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tempshare - reference-counted temp files shared across managers
#[derive(Parser)]
#[command(name = "tempshare")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reference-counted temp files shared across managers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to create temp files in
    #[arg(long, global = true, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Share one temp file across cloned managers and release them in turn
    Fanout {
        /// Number of managers cloned from the first one
        #[arg(short, long, default_value_t = 3)]
        clones: usize,

        /// Suffix for the temp file (e.g. .csv.gz)
        #[arg(short, long)]
        suffix: Option<String>,

        /// Leave the last N managers unreleased and drop them instead
        #[arg(short, long, default_value_t = 0)]
        keep: usize,

        /// Release by path instead of releasing everything
        #[arg(long)]
        by_name: bool,
    },

    /// Print the effective configuration
    Config,
}
