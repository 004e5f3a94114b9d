//! Knowledge base backend abstraction
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │   tree / search / collection services    │
//! │                   │                      │
//! │          dyn KnowledgeApi                │
//! │      ┌────────────┴────────────┐         │
//! │  ApiClient (HTTP)      test doubles      │
//! └──────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use super::error::KbResult;
use crate::remote::types::{CollectionDetail, CollectionFile, DataChunk, DatasetNode, SearchHit};

/// One method per remote operation
#[async_trait]
pub trait KnowledgeApi: Send + Sync {
    /// List nodes under `parent_id`, `deep` levels down
    async fn dataset_tree(
        &self,
        parent_id: &str,
        search_value: &str,
        deep: u32,
    ) -> KbResult<Vec<DatasetNode>>;

    /// Search a single dataset
    async fn search_dataset(
        &self,
        dataset_id: &str,
        text: &str,
        limit: u32,
    ) -> KbResult<Vec<SearchHit>>;

    /// Collection metadata (name, type, size)
    async fn collection_detail(&self, collection_id: &str) -> KbResult<CollectionDetail>;

    /// One page of chunks; the bool is true when another page may follow
    async fn collection_chunks_page(
        &self,
        collection_id: &str,
        offset: u32,
        page_size: u32,
    ) -> KbResult<(Vec<DataChunk>, bool)>;

    /// File reference behind a collection
    async fn collection_file(&self, collection_id: &str) -> KbResult<CollectionFile>;

    /// Absolute download link, if the collection is backed by a file URL
    async fn download_link(&self, collection_id: &str) -> KbResult<Option<String>>;
}
