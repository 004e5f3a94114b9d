//! `kbridge view` command - read a whole collection

use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::utils::{open_state, status};
use crate::core::collection::read_collection;
use crate::core::format::format_collection;

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Collection id
    pub collection_id: String,

    /// Chunks per page (10-100)
    #[arg(long, default_value = "50")]
    pub page_size: u32,
}

pub async fn run(args: ViewArgs, config_path: Option<&Path>) -> Result<()> {
    let state = open_state(config_path)?;
    status(format!("Reading collection {}", args.collection_id));
    let content = read_collection(state.api.as_ref(), args.collection_id.trim(), args.page_size).await?;
    println!("{}", format_collection(&content));
    Ok(())
}
