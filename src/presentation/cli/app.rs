use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// warden: watchdog and remote-administration bot for systemd services
///
/// Polls configured targets, alerts the operator over Telegram and
/// accepts recovery actions from inline buttons.
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the watchdog and the Telegram bot
    #[command(alias = "d")]
    Daemon {
        /// Print alerts to the terminal as well as Telegram
        #[arg(long)]
        echo: bool,
    },

    /// Run one watchdog pass without sending anything
    #[command(alias = "c")]
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show systemctl status of a target (all targets when omitted)
    #[command(alias = "s")]
    Status {
        /// Target key
        target: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent journal lines of a target
    #[command(alias = "l")]
    Logs {
        /// Target key
        target: String,

        /// Number of lines
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,

        /// journalctl --since expression, e.g. "1 hour ago"
        #[arg(long)]
        since: Option<String>,
    },

    /// Restart a target and verify it comes back
    Restart {
        /// Target key
        target: String,
    },

    /// List configured targets
    #[command(alias = "t")]
    Targets,

    /// Show recent operator actions
    #[command(alias = "a")]
    Audit {
        /// Number of records
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
