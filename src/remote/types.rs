//! Remote API types
//!
//! DTOs for the knowledge-base HTTP API. Field names follow the wire
//! format (camelCase, Mongo-style `_id`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============== Envelope ==============

/// Every endpoint wraps its payload as `{code, message, data}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

// ============== Dataset Tree ==============

/// Kind of a tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    Dataset,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Folder => write!(f, "folder"),
            NodeKind::Dataset => write!(f, "dataset"),
            NodeKind::Other => write!(f, "other"),
        }
    }
}

/// One entry of `/api/core/dataset/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetNode {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, rename = "canWrite")]
    pub can_write: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRequest<'a> {
    pub parent_id: &'a str,
    pub search_value: &'a str,
    pub deep: u32,
}

// ============== Search ==============

/// One typed relevance signal, e.g. `{"type": "reRank", "value": 0.91}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub index: Option<i64>,
}

/// One hit from `/api/core/dataset/searchTest`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub q: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub source_name: String,
    pub collection_id: String,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub score: Vec<ScoreEntry>,
    #[serde(default)]
    pub tokens: u64,
    #[serde(default)]
    pub chunk_index: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub dataset_id: &'a str,
    pub text: &'a str,
    pub search_mode: &'a str,
    pub embedding_weight: f64,
    #[serde(rename = "usingReRank")]
    pub using_rerank: bool,
    pub rerank_weight: f64,
    pub limit: u32,
}

/// `data` of the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub list: Vec<SearchHit>,
}

// ============== Collections ==============

/// `/api/core/dataset/collection/detail`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDetail {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub raw_text_length: Option<u64>,
}

/// `/api/core/dataset/collection/read`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionFile {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFileRequest<'a> {
    pub collection_id: &'a str,
}

/// One chunk from `/api/core/dataset/data/v2/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChunk {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub dataset_id: String,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub chunk_index: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkPageRequest<'a> {
    pub offset: u32,
    pub page_size: u32,
    pub collection_id: &'a str,
    pub search_text: &'a str,
}

/// `data` of the chunk list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkPayload {
    #[serde(default)]
    pub list: Vec<DataChunk>,
}
