//! Error types for knowledge-base operations
//!
//! Library code returns [`KbError`]; the CLI and server start-up wrap it in
//! `anyhow` the same way they wrap config and IO failures.

use std::fmt;

use thiserror::Error;

/// Result alias for knowledge-base operations
pub type KbResult<T> = std::result::Result<T, KbError>;

/// Where a remote failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Non-2xx HTTP status
    Http(u16),
    /// 2xx HTTP status but the envelope `code` was not 200
    Api(i64),
    /// Transport failure (connect, timeout, TLS)
    Unreachable,
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteStatus::Http(code) => write!(f, "HTTP {}", code),
            RemoteStatus::Api(code) => write!(f, "API code {}", code),
            RemoteStatus::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// One dataset whose every search call failed
#[derive(Debug, Clone)]
pub struct DatasetFailure {
    pub dataset_id: String,
    pub reason: String,
}

impl fmt::Display for DatasetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dataset_id, self.reason)
    }
}

#[derive(Error, Debug)]
pub enum KbError {
    #[error("Remote API error ({status}): {body}")]
    RemoteApi { status: RemoteStatus, body: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("No scope is set for this session and no default parent id is configured. Call set_scope first.")]
    MissingScope,

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("All {} dataset searches failed: {}", .0.len(), join_failures(.0))]
    AllDatasetsFailed(Vec<DatasetFailure>),
}

impl KbError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        KbError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(endpoint: &str, reason: impl fmt::Display) -> Self {
        KbError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn join_failures(failures: &[DatasetFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check that an integer argument falls inside an inclusive range
pub fn check_range(name: &str, value: i64, min: i64, max: i64) -> KbResult<()> {
    if value < min || value > max {
        return Err(KbError::invalid(
            name,
            format!("must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

/// Check that a string argument is not blank
pub fn check_not_blank(name: &str, value: &str) -> KbResult<()> {
    if value.trim().is_empty() {
        return Err(KbError::invalid(name, "must not be empty"));
    }
    Ok(())
}
