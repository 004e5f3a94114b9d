//! SSE transport
//!
//! `GET /sse?parent_id=..` opens an event stream and registers a session;
//! the first event names the endpoint to POST messages to. Responses and
//! notifications travel back on the stream. The session is removed when
//! the stream is dropped.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;

use super::server::McpServer;
use crate::core::session::{SessionContext, SessionRegistry};

/// Shared state of the SSE app
#[derive(Clone)]
pub struct AppState {
    pub server: McpServer,
    pub sessions: Arc<SessionRegistry>,
    /// Query parameter carrying the session scope
    pub scope_param: Arc<str>,
}

impl AppState {
    pub fn new(server: McpServer, scope_param: &str) -> Self {
        Self {
            server,
            sessions: Arc::new(SessionRegistry::new()),
            scope_param: Arc::from(scope_param),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/sse", get(sse_handler))
        .route("/messages", post(message_handler))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "SSE transport listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Removes the session from the registry when the stream goes away
struct SessionGuard {
    sessions: Arc<SessionRegistry>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions.remove(&self.session_id);
        tracing::info!(session_id = %self.session_id, "SSE session closed");
    }
}

async fn sse_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let session = Arc::new(SessionContext::new(Some(tx)));
    let session_id = session.id().to_string();

    let bound = session.bind_from_connection(&params, &state.scope_param);
    tracing::info!(
        session_id = %session_id,
        scope = ?session.scope(),
        bound,
        "SSE session opened"
    );
    state.sessions.insert(session);

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?session_id={}", session_id));
    let guard = SessionGuard {
        sessions: state.sessions.clone(),
        session_id,
    };

    let messages = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let message = rx.recv().await?;
        Some((
            Ok(Event::default().event("message").data(message)),
            (rx, guard),
        ))
    });
    let events = stream::once(async move { Ok::<_, Infallible>(endpoint) }).chain(messages);

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    session_id: String,
}

async fn message_handler(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let Some(session) = state.sessions.get(&query.session_id) else {
        tracing::warn!(session_id = %query.session_id, "message for unknown session");
        return (StatusCode::NOT_FOUND, "Unknown session").into_response();
    };

    let server = state.server.clone();
    tokio::spawn(async move {
        if let Some(response) = server.handle_line(&session, &body).await {
            if !session.send_line(response.to_line()) {
                tracing::debug!(session_id = %session.id(), "response dropped, client gone");
            }
        }
    });

    StatusCode::ACCEPTED.into_response()
}
