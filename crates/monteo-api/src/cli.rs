//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Monteo -- installation job pipeline tracker.
#[derive(Debug, Parser)]
#[command(name = "monteo", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Listen port (overrides config.toml).
        #[arg(long)]
        port: Option<u16>,
        /// Data directory (overrides MONTEO_DATA_DIR).
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Emit JSON-lines logs instead of human-readable output.
        #[arg(long)]
        json_logs: bool,
    },
    /// Create an API key and print it once.
    InitKey {
        /// Role for the key: office, installer or client.
        #[arg(long, default_value = "office")]
        role: String,
        /// Display name for the key.
        #[arg(long, default_value = "default")]
        name: String,
        /// Data directory (overrides MONTEO_DATA_DIR).
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}
