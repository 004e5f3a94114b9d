//! Configuration module

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::search::TokenSplitPolicy;
use crate::core::session::DEFAULT_SCOPE_PARAM;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "KBRIDGE_CONFIG";

const CONFIG_DIR: &str = ".kbridge";
const CONFIG_FILE: &str = "config.toml";
const REDACTED: &str = "********";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Remote knowledge base connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBaseConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// Scope used when a session has none bound
    #[serde(default)]
    pub default_parent_id: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            default_parent_id: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// SSE listener
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Query parameter on the SSE URL that carries the session scope
    #[serde(default = "default_scope_param")]
    pub scope_param: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            scope_param: default_scope_param(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    18007
}

fn default_scope_param() -> String {
    DEFAULT_SCOPE_PARAM.to_string()
}

/// Parameters forwarded on every dataset search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(default = "default_weight")]
    pub embedding_weight: f64,

    #[serde(default = "default_using_rerank")]
    pub using_rerank: bool,

    #[serde(default = "default_weight")]
    pub rerank_weight: f64,

    #[serde(default)]
    pub token_split: TokenSplitPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            embedding_weight: default_weight(),
            using_rerank: default_using_rerank(),
            rerank_weight: default_weight(),
            token_split: TokenSplitPolicy::default(),
        }
    }
}

fn default_mode() -> String {
    "embedding".to_string()
}

fn default_weight() -> f64 {
    0.5
}

fn default_using_rerank() -> bool {
    true
}

impl Config {
    /// Load config from default locations, then apply env overrides
    ///
    /// Order: `explicit` (or `KBRIDGE_CONFIG`), local `.kbridge/config.toml`
    /// walking up from the working directory, `~/.kbridge/config.toml`,
    /// built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::locate(explicit) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load_from(&path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Path of the file `load` would read, if any
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        if let Some(local) = Self::find_local_config() {
            return Some(local);
        }
        Self::global_config_path().filter(|p| p.exists())
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override fields from `KBRIDGE_*` variables
    ///
    /// Takes a lookup function so callers control the environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("KBRIDGE_BASE_URL") {
            self.knowledge_base.base_url = v;
        }
        if let Some(v) = get("KBRIDGE_TOKEN") {
            self.knowledge_base.token = Some(v);
        }
        if let Some(v) = get("KBRIDGE_DEFAULT_PARENT_ID") {
            self.knowledge_base.default_parent_id = Some(v);
        }
        if let Some(v) = get("KBRIDGE_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("KBRIDGE_PORT") {
            match v.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %v, "ignoring invalid KBRIDGE_PORT"),
            }
        }
    }

    /// Copy safe to print: the token is masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.knowledge_base.token.is_some() {
            copy.knowledge_base.token = Some(REDACTED.to_string());
        }
        copy
    }

    /// Find local .kbridge/config.toml walking up directories
    pub fn find_local_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Get global config path (~/.kbridge/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|d| d.home_dir().join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Local config path for `dir` (used by `config init`)
    pub fn local_config_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_DIR).join(CONFIG_FILE)
    }
}
