//! STDIO transport
//!
//! One session per process. Requests are read line by line from stdin;
//! responses and notifications are written as lines to stdout by a single
//! writer task so they never interleave.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use super::server::McpServer;
use crate::core::session::SessionContext;

/// Run the MCP server over stdin/stdout
pub async fn run_stdio(server: McpServer, scope: Option<String>) -> Result<()> {
    tracing::info!("kbridge MCP server starting on stdio");
    let reader = BufReader::new(tokio::io::stdin());
    run_with(server, scope, reader, tokio::io::stdout()).await?;
    tracing::info!("kbridge MCP server stopping");
    Ok(())
}

/// Serve one session over arbitrary streams; returns the writer when input ends
pub async fn run_with<R, W>(
    server: McpServer,
    scope: Option<String>,
    reader: R,
    writer: W,
) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let session = SessionContext::new(Some(tx));
    if let Some(scope) = scope.filter(|s| !s.trim().is_empty()) {
        session.set_scope(scope);
    }
    tracing::info!(session_id = %session.id(), scope = ?session.scope(), "stdio session opened");

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(writer)
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let preview: String = line.chars().take(100).collect();
        tracing::debug!(received = %preview, "stdio message");

        if let Some(response) = server.handle_line(&session, &line).await {
            session.send_line(response.to_line());
        }
    }

    // Dropping the session closes the channel and lets the writer finish
    drop(session);
    let writer = writer_task.await??;
    Ok(writer)
}
