//! MCP tool argument structs and the tool catalogue

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Bind a user identity to the session
#[derive(Debug, Deserialize, Serialize)]
pub struct SetUserContextTool {
    pub userid: String,
}

/// Bind a scope (root folder id) to the session
#[derive(Debug, Deserialize, Serialize)]
pub struct SetScopeTool {
    pub scope_id: String,
}

/// Tree under the session scope
#[derive(Debug, Deserialize, Serialize)]
pub struct GetDatasetTreeTool {
    #[serde(default)]
    pub search_value: String,
    #[serde(default = "default_tree_depth")]
    pub deep: i64,
}

fn default_tree_depth() -> i64 {
    4
}

/// Tree under an explicit folder
#[derive(Debug, Deserialize, Serialize)]
pub struct ExploreFolderContentsTool {
    pub folder_id: String,
    #[serde(default)]
    pub search_value: String,
    #[serde(default = "default_folder_depth")]
    pub deep: i64,
}

fn default_folder_depth() -> i64 {
    6
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchDatasetTool {
    pub dataset_id: String,
    pub text: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    10
}

/// Dataset ids as sent by clients: `"a,b"` or `["a", "b"]`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DatasetIds {
    List(Vec<String>),
    Joined(String),
}

impl DatasetIds {
    /// Trimmed, non-empty ids in the order given
    pub fn to_vec(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            DatasetIds::List(ids) => ids.iter().map(String::as_str).collect(),
            DatasetIds::Joined(joined) => joined.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultiDatasetSearchTool {
    pub dataset_ids: DatasetIds,
    pub query: String,
    #[serde(default = "default_limit_per_dataset")]
    pub limit_per_dataset: i64,
}

fn default_limit_per_dataset() -> i64 {
    5
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ViewCollectionContentTool {
    pub collection_id: String,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_size() -> i64 {
    50
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExpandSearchKeywordsTool {
    pub original_query: String,
    #[serde(default = "default_expansion_type")]
    pub expansion_type: String,
}

fn default_expansion_type() -> String {
    "comprehensive".to_string()
}

/// `tools/list` payload
pub fn tool_definitions() -> Value {
    json!({
        "tools": [
            {
                "name": "set_user_context",
                "description": "Record who is asking. Call once at the start of a conversation. Example: set_user_context({\"userid\": \"alice\"})",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "userid": { "type": "string", "description": "User identifier" }
                    },
                    "required": ["userid"]
                }
            },
            {
                "name": "set_scope",
                "description": "Set the root folder id that get_dataset_tree starts from. Overrides the scope given on the connection URL.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "scope_id": { "type": "string", "description": "Root folder id" }
                    },
                    "required": ["scope_id"]
                }
            },
            {
                "name": "clear_user_context",
                "description": "Forget the user and scope bound to this session.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "get_dataset_tree",
                "description": "List folders and datasets under the session scope. Use first to find dataset ids for searching.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "search_value": { "type": "string", "description": "Optional name filter" },
                        "deep": { "type": "integer", "description": "Depth 1-10 (default: 4)", "default": 4 }
                    }
                }
            },
            {
                "name": "explore_folder_contents",
                "description": "List folders and datasets under a specific folder id.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "folder_id": { "type": "string", "description": "Folder id from get_dataset_tree" },
                        "search_value": { "type": "string", "description": "Optional name filter" },
                        "deep": { "type": "integer", "description": "Depth 1-10 (default: 6)", "default": 6 }
                    },
                    "required": ["folder_id"]
                }
            },
            {
                "name": "search_dataset",
                "description": "Search one dataset. Multi-word queries are searched word by word and merged. Example: search_dataset({\"dataset_id\": \"...\", \"text\": \"travel policy\"})",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "dataset_id": { "type": "string", "description": "Dataset id" },
                        "text": { "type": "string", "description": "Search text" },
                        "limit": { "type": "integer", "description": "Max results 1-50 (default: 10)", "default": 10 }
                    },
                    "required": ["dataset_id", "text"]
                }
            },
            {
                "name": "multi_dataset_search",
                "description": "Search up to 5 datasets concurrently and merge the results by relevance. Datasets that fail are reported, the rest still return results.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "dataset_ids": {
                            "description": "Comma-separated ids or an array of ids (1-5)",
                            "oneOf": [
                                { "type": "string" },
                                { "type": "array", "items": { "type": "string" } }
                            ]
                        },
                        "query": { "type": "string", "description": "Search text" },
                        "limit_per_dataset": { "type": "integer", "description": "Max results per dataset 1-20 (default: 5)", "default": 5 }
                    },
                    "required": ["dataset_ids", "query"]
                }
            },
            {
                "name": "view_collection_content",
                "description": "Read a whole document (collection) chunk by chunk, with its source information.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "collection_id": { "type": "string", "description": "Document id from a search result" },
                        "page_size": { "type": "integer", "description": "Chunks per page 10-100 (default: 50)", "default": 50 }
                    },
                    "required": ["collection_id"]
                }
            },
            {
                "name": "expand_search_keywords",
                "description": "Expand a query into synonyms, related words and context words for wider searches.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "original_query": { "type": "string", "description": "Query to expand" },
                        "expansion_type": {
                            "type": "string",
                            "enum": ["basic", "comprehensive", "contextual"],
                            "default": "comprehensive"
                        }
                    },
                    "required": ["original_query"]
                }
            }
        ]
    })
}
