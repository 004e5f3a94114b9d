//! CLI module - Command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod config;
pub mod expand;
pub mod search;
pub mod serve;
pub mod tree;
pub mod utils;
pub mod view;

/// kbridge - MCP bridge for remote knowledge-base datasets
///
/// Serves dataset browsing, search and document reading to AI agents over
/// stdio or SSE. The other commands run the same operations from a shell.
#[derive(Parser, Debug)]
#[command(name = "kbridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "KBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server
    Serve(serve::ServeArgs),

    /// Show the dataset tree under a folder
    Tree(tree::TreeArgs),

    /// Search one or more datasets
    Search(search::SearchArgs),

    /// Read a whole collection (document)
    View(view::ViewArgs),

    /// Expand a query into related keywords
    Expand(expand::ExpandArgs),

    /// Show or create configuration
    Config(config::ConfigArgs),
}
