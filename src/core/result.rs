//! Search results and their ranking
//!
//! Ranking key: rerank score (embedding score when rerank is absent),
//! descending; ties broken by embedding score, descending.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::remote::types::{CollectionDetail, SearchHit};

/// Score type names used by the search engine
const EMBEDDING_SCORE: &str = "embedding";
const RERANK_SCORE: &str = "rerank";

/// One search hit, normalized
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub content: String,
    pub answer: Option<String>,
    pub embedding_score: Option<f64>,
    pub rerank_score: Option<f64>,
    pub token_count: u64,
    pub chunk_index: i64,
    pub source_document_id: String,
    pub source_filename: String,
    pub source_dataset_id: String,
    pub download_link: Option<String>,
    pub document_type: Option<String>,
    pub text_length: Option<u64>,
}

impl SearchResult {
    /// Build from a raw hit returned for `dataset_id`
    pub fn from_hit(dataset_id: &str, hit: SearchHit) -> Self {
        let mut embedding_score = None;
        let mut rerank_score = None;
        for entry in &hit.score {
            match entry.kind.to_ascii_lowercase().as_str() {
                EMBEDDING_SCORE => embedding_score = Some(entry.value),
                RERANK_SCORE => rerank_score = Some(entry.value),
                _ => {}
            }
        }

        Self {
            content: hit.q,
            answer: Some(hit.a).filter(|a| !a.trim().is_empty()),
            embedding_score,
            rerank_score,
            token_count: hit.tokens,
            chunk_index: hit.chunk_index,
            source_document_id: hit.collection_id,
            source_filename: hit.source_name,
            source_dataset_id: hit.dataset_id.unwrap_or_else(|| dataset_id.to_string()),
            download_link: None,
            document_type: None,
            text_length: None,
        }
    }

    /// Primary ranking signal
    pub fn primary_score(&self) -> f64 {
        self.rerank_score
            .or(self.embedding_score)
            .unwrap_or(0.0)
    }

    /// Fill in document metadata fetched after the search
    pub fn enrich(&mut self, detail: Option<&CollectionDetail>, download_link: Option<String>) {
        if let Some(detail) = detail {
            if !detail.name.is_empty() {
                self.source_filename = detail.name.clone();
            }
            self.document_type = Some(detail.kind.clone());
            self.text_length = detail.raw_text_length;
        }
        self.download_link = download_link;
    }
}

/// Ordering for "better first" sorting
pub fn rank_order(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.primary_score()
        .total_cmp(&a.primary_score())
        .then_with(|| {
            b.embedding_score
                .unwrap_or(0.0)
                .total_cmp(&a.embedding_score.unwrap_or(0.0))
        })
}

/// Deduplicate by source document, sort, truncate
///
/// When two results share a document id the higher-ranked one is kept.
pub fn merge_ranked(results: Vec<SearchResult>, cap: usize) -> Vec<SearchResult> {
    let mut best: HashMap<String, SearchResult> = HashMap::new();
    for result in results {
        let keep_existing = best
            .get(&result.source_document_id)
            .is_some_and(|existing| rank_order(&result, existing) != Ordering::Less);
        if !keep_existing {
            best.insert(result.source_document_id.clone(), result);
        }
    }

    let mut merged: Vec<SearchResult> = best.into_values().collect();
    merged.sort_by(|a, b| rank_order(a, b).then_with(|| a.source_document_id.cmp(&b.source_document_id)));
    merged.truncate(cap);
    merged
}
