//! MCP Tool handlers
//!
//! Each module handles a group of related tools.

pub mod collection;
pub mod context;
pub mod keywords;
pub mod search;
pub mod tree;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::state::ServerState;
use crate::core::error::{KbError, KbResult};
use crate::core::session::SessionContext;

/// Result type for tool handlers
pub type ToolResult = KbResult<String>;

/// Dispatch a tool call to the appropriate handler
///
/// `None` means the tool name is unknown.
pub async fn dispatch_tool(
    state: &ServerState,
    session: &SessionContext,
    name: &str,
    args: &Value,
) -> Option<ToolResult> {
    let result = match name {
        // Session tools
        "set_user_context" => context::do_set_user_context(session, args),
        "set_scope" => context::do_set_scope(session, args),
        "clear_user_context" => context::do_clear_user_context(session, args),

        // Tree tools
        "get_dataset_tree" => tree::do_get_dataset_tree(state, session, args).await,
        "explore_folder_contents" => tree::do_explore_folder_contents(state, args).await,

        // Search tools
        "search_dataset" => search::do_search_dataset(state, session, args).await,
        "multi_dataset_search" => search::do_multi_dataset_search(state, session, args).await,

        // Document tools
        "view_collection_content" => collection::do_view_collection_content(state, args).await,
        "expand_search_keywords" => keywords::do_expand_search_keywords(state, args),

        _ => return None,
    };
    Some(result)
}

/// Deserialize tool arguments; missing arguments read as `{}`
pub(crate) fn parse_args<T: DeserializeOwned>(args: &Value) -> KbResult<T> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args.clone()
    };
    serde_json::from_value(args).map_err(|e| KbError::invalid("arguments", e.to_string()))
}
