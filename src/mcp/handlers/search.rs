//! Search handlers for MCP

use serde_json::Value;

use super::{parse_args, ToolResult};
use crate::core::error::{check_not_blank, check_range};
use crate::core::format::{format_multi_search_report, format_search_report};
use crate::core::search::{enrich_results, SearchCoordinator};
use crate::core::session::SessionContext;
use crate::mcp::state::ServerState;
use crate::mcp::tools::{MultiDatasetSearchTool, SearchDatasetTool};

const MAX_DATASETS: usize = 5;

/// Search a single dataset
pub async fn do_search_dataset(
    state: &ServerState,
    session: &SessionContext,
    args: &Value,
) -> ToolResult {
    let tool_args: SearchDatasetTool = parse_args(args)?;
    check_not_blank("dataset_id", &tool_args.dataset_id)?;
    check_not_blank("text", &tool_args.text)?;
    check_range("limit", tool_args.limit, 1, 50)?;

    let dataset_id = tool_args.dataset_id.trim().to_string();
    let limit = tool_args.limit as u32;
    tracing::info!(session_id = %session.id(), dataset_id = %dataset_id, query = %tool_args.text, "search_dataset");

    let coordinator = SearchCoordinator::new(state.api.as_ref(), state.config.search.token_split);
    let mut set = coordinator
        .search_single(&dataset_id, &tool_args.text, limit)
        .await?;

    enrich_results(state.api.as_ref(), &mut set.results).await;
    Ok(format_search_report(&dataset_id, tool_args.text.trim(), &set.results))
}

/// Search several datasets concurrently and merge
pub async fn do_multi_dataset_search(
    state: &ServerState,
    session: &SessionContext,
    args: &Value,
) -> ToolResult {
    let tool_args: MultiDatasetSearchTool = parse_args(args)?;
    let dataset_ids = tool_args.dataset_ids.to_vec();
    check_range("dataset_ids", dataset_ids.len() as i64, 1, MAX_DATASETS as i64)?;
    check_not_blank("query", &tool_args.query)?;
    check_range("limit_per_dataset", tool_args.limit_per_dataset, 1, 20)?;

    tracing::info!(
        session_id = %session.id(),
        datasets = dataset_ids.len(),
        query = %tool_args.query,
        "multi_dataset_search"
    );
    session.notify_info(format!(
        "Searching {} datasets for \"{}\"",
        dataset_ids.len(),
        tool_args.query.trim()
    ));

    let coordinator = SearchCoordinator::new(state.api.as_ref(), state.config.search.token_split);
    let mut set = coordinator
        .search(
            &dataset_ids,
            &tool_args.query,
            tool_args.limit_per_dataset as u32,
            None,
        )
        .await?;

    session.notify_info(format!(
        "{} of {} datasets answered, {} results; fetching document details",
        set.succeeded(),
        set.datasets_searched,
        set.results.len()
    ));
    enrich_results(state.api.as_ref(), &mut set.results).await;

    Ok(format_multi_search_report(tool_args.query.trim(), &set))
}
