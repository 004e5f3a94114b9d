//! kbridge CLI - Entry point
//!
//! Usage: kbridge <command> [options]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kbridge::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the stdio transport, so logs go to stderr
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => kbridge::cli::serve::run(args, config_path).await,
        Commands::Tree(args) => kbridge::cli::tree::run(args, config_path).await,
        Commands::Search(args) => kbridge::cli::search::run(args, config_path).await,
        Commands::View(args) => kbridge::cli::view::run(args, config_path).await,
        Commands::Expand(args) => kbridge::cli::expand::run(args),
        Commands::Config(args) => kbridge::cli::config::run(args, config_path),
    }
}
