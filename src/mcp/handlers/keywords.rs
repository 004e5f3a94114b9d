//! Keyword expansion handler for MCP

use serde_json::Value;

use super::{parse_args, ToolResult};
use crate::core::format::format_expansion;
use crate::core::keywords::ExpansionMode;
use crate::mcp::state::ServerState;
use crate::mcp::tools::ExpandSearchKeywordsTool;

pub fn do_expand_search_keywords(state: &ServerState, args: &Value) -> ToolResult {
    let tool_args: ExpandSearchKeywordsTool = parse_args(args)?;
    let mode: ExpansionMode = tool_args.expansion_type.parse()?;

    let expansion = state.expander.expand(&tool_args.original_query, mode)?;
    Ok(format_expansion(&expansion))
}
