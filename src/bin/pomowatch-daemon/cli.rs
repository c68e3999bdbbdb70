use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(version, about = "Pomodoro timer daemon", long_about = None)]
pub struct Arguments {
    /// Path to a custom configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Path where the daemon creates the UNIX socket
    #[arg(short, long)]
    pub socket: Option<PathBuf>,
    /// Whether to daemonize the process
    #[arg(short, long)]
    pub daemonize: bool,
    /// Maximum logging level the subscriber should use
    #[arg(short, long, default_value_t = Level::INFO)]
    pub verbosity: Level,
}
