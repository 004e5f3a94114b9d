//! In-memory `KnowledgeApi` for unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;

use super::error::{KbError, KbResult, RemoteStatus};
use super::kb::KnowledgeApi;
use crate::remote::types::{
    CollectionDetail, CollectionFile, DataChunk, DatasetNode, NodeKind, ScoreEntry, SearchHit,
};

#[derive(Default)]
pub struct FakeApi {
    /// (dataset_id, text) -> hits or error message
    pub searches: HashMap<(String, String), Result<Vec<SearchHit>, String>>,
    /// parent_id -> children or error message
    pub trees: HashMap<String, Result<Vec<DatasetNode>, String>>,
    pub details: HashMap<String, CollectionDetail>,
    pub links: HashMap<String, String>,
    pub chunks: HashMap<String, Vec<DataChunk>>,
    pub calls: Mutex<Vec<String>>,
    pub barrier: Option<Arc<Barrier>>,
}

fn remote_err(msg: &str) -> KbError {
    KbError::RemoteApi {
        status: RemoteStatus::Http(500),
        body: msg.to_string(),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, dataset: &str, text: &str, hits: Vec<SearchHit>) -> Self {
        self.searches
            .insert((dataset.to_string(), text.to_string()), Ok(hits));
        self
    }

    pub fn with_failing_search(mut self, dataset: &str, text: &str, msg: &str) -> Self {
        self.searches
            .insert((dataset.to_string(), text.to_string()), Err(msg.to_string()));
        self
    }

    pub fn with_tree(mut self, parent: &str, nodes: Vec<DatasetNode>) -> Self {
        self.trees.insert(parent.to_string(), Ok(nodes));
        self
    }

    pub fn with_failing_tree(mut self, parent: &str, msg: &str) -> Self {
        self.trees.insert(parent.to_string(), Err(msg.to_string()));
        self
    }

    pub fn with_detail(mut self, detail: CollectionDetail) -> Self {
        self.details.insert(detail.id.clone(), detail);
        self
    }

    pub fn with_link(mut self, collection: &str, link: &str) -> Self {
        self.links.insert(collection.to_string(), link.to_string());
        self
    }

    pub fn with_chunks(mut self, collection: &str, chunks: Vec<DataChunk>) -> Self {
        self.chunks.insert(collection.to_string(), chunks);
        self
    }

    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn hit(collection: &str, rerank: f64, embedding: f64) -> SearchHit {
    SearchHit {
        id: format!("chunk-{}", collection),
        q: format!("content from {}", collection),
        a: String::new(),
        source_name: format!("{}.pdf", collection),
        collection_id: collection.to_string(),
        dataset_id: None,
        score: vec![
            ScoreEntry {
                kind: "embedding".to_string(),
                value: embedding,
                index: Some(0),
            },
            ScoreEntry {
                kind: "reRank".to_string(),
                value: rerank,
                index: Some(0),
            },
        ],
        tokens: 50,
        chunk_index: 0,
    }
}

pub fn node(id: &str, name: &str, kind: NodeKind) -> DatasetNode {
    DatasetNode {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        intro: None,
        avatar: None,
        can_write: false,
    }
}

pub fn chunk(collection: &str, index: i64, text: &str) -> DataChunk {
    DataChunk {
        id: format!("{}-{}", collection, index),
        dataset_id: "ds-1".to_string(),
        collection_id: collection.to_string(),
        q: text.to_string(),
        a: String::new(),
        chunk_index: index,
    }
}

#[async_trait]
impl KnowledgeApi for FakeApi {
    async fn dataset_tree(
        &self,
        parent_id: &str,
        search_value: &str,
        deep: u32,
    ) -> KbResult<Vec<DatasetNode>> {
        self.record(format!("tree:{}:{}:{}", parent_id, search_value, deep));
        match self.trees.get(parent_id) {
            Some(Ok(nodes)) => Ok(nodes.clone()),
            Some(Err(msg)) => Err(remote_err(msg)),
            None => Ok(Vec::new()),
        }
    }

    async fn search_dataset(
        &self,
        dataset_id: &str,
        text: &str,
        limit: u32,
    ) -> KbResult<Vec<SearchHit>> {
        self.record(format!("search:{}:{}:{}", dataset_id, text, limit));
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        match self.searches.get(&(dataset_id.to_string(), text.to_string())) {
            Some(Ok(hits)) => Ok(hits.iter().take(limit as usize).cloned().collect()),
            Some(Err(msg)) => Err(remote_err(msg)),
            None => Ok(Vec::new()),
        }
    }

    async fn collection_detail(&self, collection_id: &str) -> KbResult<CollectionDetail> {
        self.details
            .get(collection_id)
            .cloned()
            .ok_or_else(|| remote_err("detail not found"))
    }

    async fn collection_chunks_page(
        &self,
        collection_id: &str,
        offset: u32,
        page_size: u32,
    ) -> KbResult<(Vec<DataChunk>, bool)> {
        self.record(format!("chunks:{}:{}:{}", collection_id, offset, page_size));
        let all = self.chunks.get(collection_id).cloned().unwrap_or_default();
        let page: Vec<DataChunk> = all
            .into_iter()
            .skip(offset as usize)
            .take(page_size as usize)
            .collect();
        let has_more = page.len() == page_size as usize;
        Ok((page, has_more))
    }

    async fn collection_file(&self, collection_id: &str) -> KbResult<CollectionFile> {
        match self.links.get(collection_id) {
            Some(link) => Ok(CollectionFile {
                kind: "url".to_string(),
                value: link.clone(),
                name: None,
            }),
            None => Err(remote_err("file not found")),
        }
    }

    async fn download_link(&self, collection_id: &str) -> KbResult<Option<String>> {
        Ok(self.links.get(collection_id).cloned())
    }
}
