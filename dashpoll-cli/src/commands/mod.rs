//! Command handlers
//!
//! Routes CLI commands to their handlers.

mod fetch;
mod watch;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use dashpoll_executor::ExecutorState;

use crate::config::Config;

pub use fetch::FetchArgs;
pub use watch::WatchArgs;

/// Top-level commands
#[derive(Subcommand)]
pub enum Commands {
    /// Poll a document on an interval and print every payload
    Watch(WatchArgs),
    /// Fetch a document once and print it
    Fetch(FetchArgs),
}

/// Handle a command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Watch(args) => watch::handle_watch(args, config).await,
        Commands::Fetch(args) => fetch::handle_fetch(args, config).await,
    }
}

/// Colorize an executor state for display
pub fn colorize_state(state: ExecutorState) -> ColoredString {
    match state {
        ExecutorState::Idle => "idle".dimmed(),
        ExecutorState::Scheduled => "scheduled".green(),
        ExecutorState::InFlight => "in flight".cyan(),
        ExecutorState::Paused => "paused".yellow(),
    }
}

/// Pretty-print a JSON value, falling back to its compact form
pub fn render_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
