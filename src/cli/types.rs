//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments of the `boiler` binary.
#[derive(Parser)]
#[command(name = "boiler")]
#[command(about = "Boiler - layered configuration bootstrap", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding default-config.* and <profile>-config.*
    #[arg(long, global = true, default_value = "config")]
    pub config_dir: PathBuf,

    /// Root for file:// remote URLs
    #[arg(long, global = true, default_value = ".")]
    pub files_dir: PathBuf,

    /// Prefix of the environment layer (defaults to BOILER_)
    #[arg(long, global = true)]
    pub env_prefix: Option<String>,

    /// Profile whose <profile>-config.* sits above the default file
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Extra configuration file, ranked in the order given
    #[arg(long = "extra", global = true)]
    pub extras: Vec<PathBuf>,

    /// Remote configuration URL, ranked after the extra files
    #[arg(long = "url", global = true)]
    pub urls: Vec<String>,
}

/// Subcommands; each prints JSON on stdout.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the merged value at a key path
    Get {
        /// Key path, `:` separated (`logs:console:level`)
        key: String,
    },

    /// Print the full merged configuration
    Dump,

    /// Print the value at a key path with the scope it came from
    Scope {
        /// Key path, `:` separated (`logs:console:level`)
        key: String,
    },
}
