//! `kbridge search` command
//!
//! Searches one dataset, or several concurrently with merged ranking.
//!
//! # Usage
//! ```bash
//! kbridge search "报销 流程" -d d1
//! kbridge search "差旅标准" -d d1,d2,d3 --limit 3
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::utils::{open_state, status};
use crate::core::format::{format_multi_search_report, format_search_report};
use crate::core::search::{enrich_results, SearchCoordinator};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Dataset ids (comma-separated)
    #[arg(short, long = "dataset", value_delimiter = ',', required = true)]
    pub datasets: Vec<String>,

    /// Maximum results per dataset
    #[arg(short, long, default_value = "5")]
    pub limit: u32,

    /// Skip fetching collection details and download links
    #[arg(long)]
    pub no_enrich: bool,
}

pub async fn run(args: SearchArgs, config_path: Option<&Path>) -> Result<()> {
    let state = open_state(config_path)?;
    let datasets: Vec<String> = args
        .datasets
        .iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();

    status(format!(
        "Searching {} dataset(s) for \"{}\"",
        datasets.len(),
        args.query.trim()
    ));

    let coordinator = SearchCoordinator::new(state.api.as_ref(), state.config.search.token_split);
    let single = datasets.len() == 1;
    let mut set = if single {
        coordinator.search_single(&datasets[0], &args.query, args.limit).await?
    } else {
        coordinator.search(&datasets, &args.query, args.limit, None).await?
    };

    for failure in &set.failures {
        eprintln!("{} {}: {}", "⚠".yellow(), failure.dataset_id, failure.reason);
    }
    if !args.no_enrich {
        enrich_results(state.api.as_ref(), &mut set.results).await;
    }

    let report = if single {
        format_search_report(&datasets[0], args.query.trim(), &set.results)
    } else {
        format_multi_search_report(args.query.trim(), &set)
    };
    println!("{}", report);
    Ok(())
}
