//! `kbridge expand` command
//!
//! Runs offline against the built-in dictionary; no server needed.
//!
//! # Usage
//! ```bash
//! kbridge expand "报销 流程"
//! kbridge expand "网管 运维" --mode contextual
//! ```

use anyhow::{Context, Result};
use clap::Args;

use crate::core::format::format_expansion;
use crate::core::keywords::{ExpansionMode, KeywordExpander};

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Query to expand
    pub query: String,

    /// Expansion mode (basic, comprehensive, contextual)
    #[arg(short, long, default_value = "comprehensive")]
    pub mode: String,
}

pub fn run(args: ExpandArgs) -> Result<()> {
    let mode: ExpansionMode = args.mode.parse()?;
    let expander = KeywordExpander::builtin().context("Invalid keyword dictionary")?;
    let expansion = expander.expand(&args.query, mode)?;
    println!("{}", format_expansion(&expansion));
    Ok(())
}
