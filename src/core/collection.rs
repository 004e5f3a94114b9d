//! Reading a whole collection (document) chunk by chunk

use super::error::{check_range, KbResult};
use super::kb::KnowledgeApi;
use crate::remote::types::{CollectionDetail, DataChunk};

pub const MIN_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Stop paging after this many pages even if the backend keeps answering
const MAX_PAGES: u32 = 1000;

/// Everything known about one collection
#[derive(Debug, Clone)]
pub struct CollectionContent {
    pub collection_id: String,
    pub detail: Option<CollectionDetail>,
    pub download_link: Option<String>,
    pub chunks: Vec<DataChunk>,
    pub pages: u32,
}

impl CollectionContent {
    /// Display name, falling back to the id
    pub fn name(&self) -> &str {
        self.detail
            .as_ref()
            .map(|d| d.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.collection_id)
    }

    pub fn total_chars(&self) -> usize {
        self.chunks
            .iter()
            .map(|c| c.q.chars().count() + c.a.chars().count())
            .sum()
    }
}

/// Fetch every chunk of `collection_id`, plus its metadata
///
/// Paging stops on an empty page or on a page shorter than `page_size`.
pub async fn read_collection(
    api: &dyn KnowledgeApi,
    collection_id: &str,
    page_size: u32,
) -> KbResult<CollectionContent> {
    check_range(
        "page_size",
        page_size as i64,
        MIN_PAGE_SIZE as i64,
        MAX_PAGE_SIZE as i64,
    )?;

    tracing::info!(collection_id, page_size, "reading collection");

    let mut chunks = Vec::new();
    let mut offset = 0;
    let mut pages = 0;
    loop {
        let (page, has_more) = api
            .collection_chunks_page(collection_id, offset, page_size)
            .await?;
        if page.is_empty() {
            break;
        }
        pages += 1;
        let short = page.len() < page_size as usize;
        chunks.extend(page);
        tracing::debug!(collection_id, fetched = chunks.len(), "chunk page fetched");

        if short || !has_more {
            break;
        }
        if pages >= MAX_PAGES {
            tracing::warn!(collection_id, pages, "page limit reached, content truncated");
            break;
        }
        offset += page_size;
    }

    let (detail, link) = futures::join!(
        api.collection_detail(collection_id),
        api.download_link(collection_id)
    );
    let detail = match detail {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(collection_id, error = %e, "collection detail unavailable");
            None
        }
    };
    let download_link = match link {
        Ok(l) => l,
        Err(e) => {
            tracing::warn!(collection_id, error = %e, "download link unavailable");
            None
        }
    };

    tracing::info!(collection_id, chunks = chunks.len(), pages, "collection read");

    Ok(CollectionContent {
        collection_id: collection_id.to_string(),
        detail,
        download_link,
        chunks,
        pages,
    })
}
