//! MCP Server state management

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::core::kb::KnowledgeApi;
use crate::core::keywords::KeywordExpander;
use crate::remote::ApiClient;

/// Shared, read-only server state
///
/// Per-connection state lives in `SessionContext`; this is what every
/// session shares.
#[derive(Clone)]
pub struct ServerState {
    pub api: Arc<dyn KnowledgeApi>,
    pub config: Arc<Config>,
    pub expander: Arc<KeywordExpander>,
}

impl ServerState {
    pub fn new(api: Arc<dyn KnowledgeApi>, config: Config) -> Result<Self> {
        let expander = KeywordExpander::builtin().context("Invalid keyword dictionary")?;
        Ok(Self {
            api,
            config: Arc::new(config),
            expander: Arc::new(expander),
        })
    }

    /// State backed by the HTTP client described in `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let client = ApiClient::from_config(&config.knowledge_base, &config.search)?;
        Self::new(Arc::new(client), config)
    }

    /// Scope used when a session has none of its own
    pub fn default_scope(&self) -> Option<&str> {
        self.config.knowledge_base.default_parent_id.as_deref()
    }
}
