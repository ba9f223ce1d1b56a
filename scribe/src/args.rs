use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Configuration file read when `--config` is not given and it exists
pub const DEFAULT_CONFIG_PATH: &str = "scribe.toml";

/// Scribe speech-to-text server
#[derive(Debug, Parser)]
#[command(name = "scribe", about = "Speech-to-text transcription server with optional translation")]
pub struct Args {
    /// Path to configuration file [default: scribe.toml when present]
    #[arg(short, long, env = "SCRIBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "SCRIBE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter in `EnvFilter` syntax
    #[arg(long, default_value = "info", env = "SCRIBE_LOG")]
    pub log_filter: String,
}
