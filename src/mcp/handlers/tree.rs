//! Tree handlers for MCP

use serde_json::Value;

use super::{parse_args, ToolResult};
use crate::core::error::{check_not_blank, check_range};
use crate::core::format::format_tree;
use crate::core::session::SessionContext;
use crate::core::tree::{build_tree, MAX_TREE_DEPTH};
use crate::mcp::state::ServerState;
use crate::mcp::tools::{ExploreFolderContentsTool, GetDatasetTreeTool};

/// Tree under the session's scope (or the configured default)
pub async fn do_get_dataset_tree(
    state: &ServerState,
    session: &SessionContext,
    args: &Value,
) -> ToolResult {
    let tool_args: GetDatasetTreeTool = parse_args(args)?;
    check_range("deep", tool_args.deep, 1, MAX_TREE_DEPTH as i64)?;
    let scope = session.effective_scope(state.default_scope())?;

    let tree = build_tree(
        state.api.as_ref(),
        &scope,
        tool_args.search_value.trim(),
        tool_args.deep as u32,
    )
    .await?;
    Ok(format_tree(&tree))
}

pub async fn do_explore_folder_contents(state: &ServerState, args: &Value) -> ToolResult {
    let tool_args: ExploreFolderContentsTool = parse_args(args)?;
    check_not_blank("folder_id", &tool_args.folder_id)?;
    check_range("deep", tool_args.deep, 1, MAX_TREE_DEPTH as i64)?;

    let tree = build_tree(
        state.api.as_ref(),
        tool_args.folder_id.trim(),
        tool_args.search_value.trim(),
        tool_args.deep as u32,
    )
    .await?;
    Ok(format_tree(&tree))
}
