//! MCP (Model Context Protocol) Server
//!
//! Exposes the remote knowledge base via MCP tools for AI integration.
//!
//! # Tools
//! - `set_user_context` / `set_scope` / `clear_user_context` - Session context
//! - `get_dataset_tree` / `explore_folder_contents` - Browse folders and datasets
//! - `search_dataset` - Search one dataset
//! - `multi_dataset_search` - Concurrent search over up to 5 datasets
//! - `view_collection_content` - Read a whole document
//! - `expand_search_keywords` - Synonym / related-word expansion
//!
//! # Transports
//! - stdio: one session, line-delimited JSON-RPC
//! - SSE: one session per `GET /sse` connection

pub mod handlers;
pub mod jsonrpc;
pub mod server;
pub mod sse;
pub mod state;
pub mod stdio;
pub mod tools;

pub use server::McpServer;
pub use state::ServerState;
pub use stdio::run_stdio;
