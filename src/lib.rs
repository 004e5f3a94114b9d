//! kbridge - MCP bridge for remote knowledge-base datasets
//!
//! Exposes a remote knowledge-base HTTP API as a small set of MCP tools
//! for AI agents.
//!
//! ## Key Concepts
//!
//! - **Scope**: the folder a session browses by default, bound from the
//!   connection (`?parent_id=`) or set with `set_scope`
//! - **Multi-dataset search**: concurrent per-dataset searches merged by
//!   rerank score, then embedding score
//! - **Keyword expansion**: offline dictionary lookup for query rewriting
//! - **Transports**: stdio (one session) and SSE (one session per stream)

pub mod cli;
pub mod config;
pub mod core;
pub mod mcp;
pub mod remote;

pub use config::Config;
pub use core::error::{KbError, KbResult};
pub use core::kb::KnowledgeApi;
pub use mcp::{run_stdio, McpServer, ServerState};
pub use remote::ApiClient;
