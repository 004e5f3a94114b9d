//! CLI utility functions shared across commands

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::mcp::ServerState;

/// Load the effective config for a command
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path)
}

/// Server state over the HTTP client, for one-shot commands
pub fn open_state(path: Option<&Path>) -> Result<ServerState> {
    ServerState::from_config(load_config(path)?)
}

/// Status line on stderr so stdout stays clean for the report
pub fn status(msg: impl AsRef<str>) {
    eprintln!("{} {}", "→".cyan(), msg.as_ref());
}
