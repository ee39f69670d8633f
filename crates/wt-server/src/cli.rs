//! Command-line argument definitions.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Work-time tracking API server.
///
/// Records START/PAUSE/RESUME/END events per user and reports worked
/// time for the current UTC day.
#[derive(Debug, Parser)]
#[command(name = "wt-server", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides config).
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// Path to the SQLite database (overrides config).
    #[arg(long)]
    pub database: Option<PathBuf>,
}
