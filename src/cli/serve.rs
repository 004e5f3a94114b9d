//! Serve command - Start MCP server

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use super::utils::load_config;
use crate::mcp::sse::{self, AppState};
use crate::mcp::{run_stdio, McpServer, ServerState};

/// Start MCP server for AI integration
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Transport mode (stdio or sse)
    #[arg(long, default_value = "stdio")]
    pub transport: String,

    /// Bind host (sse transport; overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (sse transport; overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Scope for the stdio session; default scope for SSE sessions
    #[arg(long)]
    pub parent_id: Option<String>,
}

pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    eprintln!("🚀 Starting MCP server (transport: {})", args.transport);
    eprintln!("🔗 Knowledge base: {}", config.knowledge_base.base_url);

    match args.transport.as_str() {
        "stdio" => {
            let scope = args
                .parent_id
                .or_else(|| config.knowledge_base.default_parent_id.clone());
            let server = McpServer::new(ServerState::from_config(config)?);
            run_stdio(server, scope).await?;
        }
        "sse" => {
            if let Some(parent_id) = args.parent_id {
                config.knowledge_base.default_parent_id = Some(parent_id);
            }
            let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
                .parse()
                .with_context(|| {
                    format!(
                        "Invalid listen address {}:{}",
                        config.server.host, config.server.port
                    )
                })?;
            let scope_param = config.server.scope_param.clone();
            eprintln!("📡 Listening on http://{}/sse?{}=<id>", addr, scope_param);

            let server = McpServer::new(ServerState::from_config(config)?);
            sse::serve(AppState::new(server, &scope_param), addr).await?;
        }
        _ => {
            anyhow::bail!(
                "Unknown transport: {}. Use 'stdio' or 'sse'.",
                args.transport
            );
        }
    }

    Ok(())
}
