//! Session scope handling
//!
//! Each transport connection gets a [`SessionContext`]. The context is
//! passed by reference into every tool call; the [`SessionRegistry`] only
//! exists so the SSE transport can find the context for an incoming
//! `POST /messages?session_id=..`.
//!
//! Scope resolution order: explicitly bound scope, then the configured
//! default parent id, then [`KbError::MissingScope`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::mpsc;
use ulid::Ulid;

use super::error::{KbError, KbResult};

/// Query parameter carrying the scope at connection time
pub const DEFAULT_SCOPE_PARAM: &str = "parent_id";

/// Per-connection state threaded through tool invocations
#[derive(Debug)]
pub struct SessionContext {
    id: String,
    scope: RwLock<Option<String>>,
    user_id: RwLock<Option<String>>,
    created_at: DateTime<Utc>,
    /// Outbound channel for server-initiated notifications
    outbound: Option<mpsc::UnboundedSender<String>>,
}

impl SessionContext {
    /// Create a session with a fresh `mcp-<ulid>` id
    pub fn new(outbound: Option<mpsc::UnboundedSender<String>>) -> Self {
        Self::with_id(format!("mcp-{}", Ulid::new()), outbound)
    }

    pub fn with_id(id: impl Into<String>, outbound: Option<mpsc::UnboundedSender<String>>) -> Self {
        Self {
            id: id.into(),
            scope: RwLock::new(None),
            user_id: RwLock::new(None),
            created_at: Utc::now(),
            outbound,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Currently bound scope, if any
    pub fn scope(&self) -> Option<String> {
        read_slot(&self.scope)
    }

    /// Bind a scope, replacing any previous value
    pub fn set_scope(&self, scope_id: impl Into<String>) {
        write_slot(&self.scope, Some(scope_id.into()));
    }

    /// Bind the scope from connection query parameters, if the key is present
    ///
    /// Returns true when a scope was bound.
    pub fn bind_from_connection(&self, params: &HashMap<String, String>, key: &str) -> bool {
        match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            Some(scope) => {
                self.set_scope(scope);
                true
            }
            None => false,
        }
    }

    /// Resolve the scope for a call, falling back to the configured default
    pub fn effective_scope(&self, default: Option<&str>) -> KbResult<String> {
        self.scope()
            .or_else(|| default.filter(|d| !d.is_empty()).map(str::to_string))
            .ok_or(KbError::MissingScope)
    }

    pub fn user_id(&self) -> Option<String> {
        read_slot(&self.user_id)
    }

    pub fn set_user_id(&self, user_id: impl Into<String>) {
        write_slot(&self.user_id, Some(user_id.into()));
    }

    /// Forget user and scope
    pub fn clear(&self) {
        write_slot(&self.user_id, None);
        write_slot(&self.scope, None);
    }

    /// Push an MCP log notification to the client, if a channel is attached
    pub fn notify_info(&self, message: impl Into<String>) {
        if self.outbound.is_none() {
            return;
        }

        let notification = json!({
            "jsonrpc": "2.0",
            "method": "notifications/message",
            "params": {
                "level": "info",
                "logger": "kbridge",
                "data": message.into(),
            }
        });

        if !self.send_line(notification.to_string()) {
            tracing::debug!(session_id = %self.id, "notification dropped, client gone");
        }
    }

    /// Send a serialized JSON-RPC message; false when nobody is listening
    pub fn send_line(&self, line: String) -> bool {
        match &self.outbound {
            Some(tx) => tx.send(line).is_ok(),
            None => false,
        }
    }
}

fn read_slot(slot: &RwLock<Option<String>>) -> Option<String> {
    match slot.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn write_slot(slot: &RwLock<Option<String>>, value: Option<String>) {
    match slot.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

/// Lookup table from session id to live context
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionContext>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Arc<SessionContext>) {
        let mut map = self.sessions.write().unwrap_or_else(|p| p.into_inner());
        map.insert(session.id().to_string(), session);
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<SessionContext>> {
        let map = self.sessions.read().unwrap_or_else(|p| p.into_inner());
        map.get(session_id).cloned()
    }

    pub fn remove(&self, session_id: &str) -> Option<Arc<SessionContext>> {
        let mut map = self.sessions.write().unwrap_or_else(|p| p.into_inner());
        map.remove(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
