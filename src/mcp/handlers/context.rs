//! Session context handlers for MCP

use serde_json::Value;

use super::{parse_args, ToolResult};
use crate::core::error::check_not_blank;
use crate::core::format::{format_context_cleared, format_context_set};
use crate::core::session::SessionContext;
use crate::mcp::tools::{SetScopeTool, SetUserContextTool};

pub fn do_set_user_context(session: &SessionContext, args: &Value) -> ToolResult {
    let tool_args: SetUserContextTool = parse_args(args)?;
    check_not_blank("userid", &tool_args.userid)?;

    session.set_user_id(tool_args.userid.trim());
    tracing::info!(session_id = %session.id(), userid = %tool_args.userid, "user context set");
    session.notify_info(format!("User {} bound to this session", tool_args.userid.trim()));

    Ok(format_context_set(session))
}

pub fn do_set_scope(session: &SessionContext, args: &Value) -> ToolResult {
    let tool_args: SetScopeTool = parse_args(args)?;
    check_not_blank("scope_id", &tool_args.scope_id)?;

    session.set_scope(tool_args.scope_id.trim());
    tracing::info!(session_id = %session.id(), scope = %tool_args.scope_id, "scope set");

    Ok(format_context_set(session))
}

pub fn do_clear_user_context(session: &SessionContext, _args: &Value) -> ToolResult {
    session.clear();
    tracing::info!(session_id = %session.id(), "context cleared");
    Ok(format_context_cleared(session.id()))
}
