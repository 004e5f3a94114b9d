//! `kbridge config` command
//!
//! # Usage
//! ```bash
//! kbridge config show          # effective config, token masked
//! kbridge config path          # which file is in use
//! kbridge config init          # write ./.kbridge/config.toml
//! kbridge config init --global # write ~/.kbridge/config.toml
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use super::utils::load_config;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the config file that would be loaded
    Path,

    /// Write a config file with default values
    Init {
        /// Write the global config instead of a local one
        #[arg(long)]
        global: bool,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            let rendered = toml::to_string_pretty(&config.redacted())?;
            match Config::locate(config_path) {
                Some(path) => println!("# {}", path.display()),
                None => println!("# (defaults)"),
            }
            println!("{}", rendered);
        }
        ConfigCommands::Path => match Config::locate(config_path) {
            Some(path) => println!("{}", path.display()),
            None => println!("(no config file, using defaults)"),
        },
        ConfigCommands::Init { global, force } => {
            let path = if global {
                Config::global_config_path()
                    .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
            } else if let Some(explicit) = config_path {
                explicit.to_path_buf()
            } else {
                Config::local_config_path(&std::env::current_dir()?)
            };

            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Config::default()
                .save_to(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Wrote {}", "✅".green(), path.display());
        }
    }
    Ok(())
}
