//! `kbridge tree` command
//!
//! Prints the dataset tree under a folder.
//!
//! # Usage
//! ```bash
//! kbridge tree                      # under default_parent_id
//! kbridge tree 65f0c2 --deep 2
//! kbridge tree 65f0c2 --filter 政策
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::utils::{open_state, status};
use crate::core::format::format_tree;
use crate::core::tree::build_tree;

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Folder id (defaults to knowledge_base.default_parent_id)
    pub parent_id: Option<String>,

    /// Name filter passed to the knowledge base
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Levels to expand (1-10)
    #[arg(short, long, default_value = "4")]
    pub deep: u32,
}

pub async fn run(args: TreeArgs, config_path: Option<&Path>) -> Result<()> {
    let state = open_state(config_path)?;
    let parent_id = match args.parent_id.filter(|p| !p.trim().is_empty()) {
        Some(id) => id,
        None => state
            .default_scope()
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow::anyhow!("No folder given and knowledge_base.default_parent_id is not set")
            })?,
    };

    status(format!("Building tree under {} (depth {})", parent_id, args.deep));
    let tree = build_tree(state.api.as_ref(), &parent_id, args.filter.trim(), args.deep).await?;
    println!("{}", format_tree(&tree));
    Ok(())
}
