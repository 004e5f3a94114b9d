//! Collection (document) handlers for MCP

use serde_json::Value;

use super::{parse_args, ToolResult};
use crate::core::collection::{read_collection, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::core::error::{check_not_blank, check_range};
use crate::core::format::format_collection;
use crate::mcp::state::ServerState;
use crate::mcp::tools::ViewCollectionContentTool;

pub async fn do_view_collection_content(state: &ServerState, args: &Value) -> ToolResult {
    let tool_args: ViewCollectionContentTool = parse_args(args)?;
    check_not_blank("collection_id", &tool_args.collection_id)?;
    check_range(
        "page_size",
        tool_args.page_size,
        MIN_PAGE_SIZE as i64,
        MAX_PAGE_SIZE as i64,
    )?;
    let page_size = tool_args.page_size as u32;

    let content = read_collection(
        state.api.as_ref(),
        tool_args.collection_id.trim(),
        page_size,
    )
    .await?;
    Ok(format_collection(&content))
}
