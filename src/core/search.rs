//! Fan-out search across datasets
//!
//! Every `(dataset, sub-query)` call is issued before any of them is
//! awaited. A dataset only counts as failed when all of its sub-queries
//! fail; the whole search fails only when every dataset failed.

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::error::{check_not_blank, DatasetFailure, KbError, KbResult};
use super::kb::KnowledgeApi;
use super::result::{merge_ranked, SearchResult};

/// How a multi-word query is sent to the search engine
///
/// The engine treats the whole text as one phrase; a space is not an OR.
/// `PerToken` issues one search per whitespace-separated token and merges
/// the results, trading exact-phrase precision for recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenSplitPolicy {
    #[default]
    PerToken,
    WholePhrase,
}

impl TokenSplitPolicy {
    /// Queries actually sent for `query`
    pub fn sub_queries(&self, query: &str) -> Vec<String> {
        let trimmed = query.trim();
        match self {
            TokenSplitPolicy::WholePhrase => vec![trimmed.to_string()],
            TokenSplitPolicy::PerToken => {
                let mut tokens: Vec<String> = Vec::new();
                for token in trimmed.split_whitespace() {
                    if !tokens.iter().any(|t| t == token) {
                        tokens.push(token.to_string());
                    }
                }
                tokens
            }
        }
    }
}

/// Output of a fan-out search
#[derive(Debug, Clone, Default)]
pub struct MergedResultSet {
    pub results: Vec<SearchResult>,
    /// Datasets that contributed nothing because every call failed
    pub failures: Vec<DatasetFailure>,
    pub datasets_searched: usize,
    pub sub_queries: Vec<String>,
}

impl MergedResultSet {
    pub fn succeeded(&self) -> usize {
        self.datasets_searched - self.failures.len()
    }
}

/// Issues and merges per-dataset searches
pub struct SearchCoordinator<'a> {
    api: &'a dyn KnowledgeApi,
    policy: TokenSplitPolicy,
}

impl<'a> SearchCoordinator<'a> {
    pub fn new(api: &'a dyn KnowledgeApi, policy: TokenSplitPolicy) -> Self {
        Self { api, policy }
    }

    /// Search every dataset and merge the results
    ///
    /// Each dataset keeps at most `limit_per_dataset` results; the merged
    /// set is capped at `cap`, or at `limit_per_dataset * datasets`.
    pub async fn search(
        &self,
        dataset_ids: &[String],
        query: &str,
        limit_per_dataset: u32,
        cap: Option<usize>,
    ) -> KbResult<MergedResultSet> {
        if dataset_ids.is_empty() {
            return Err(KbError::invalid("dataset_ids", "at least one dataset id is required"));
        }
        for id in dataset_ids {
            check_not_blank("dataset_ids", id)?;
        }
        check_not_blank("query", query)?;
        if limit_per_dataset == 0 {
            return Err(KbError::invalid("limit_per_dataset", "must be positive"));
        }

        let sub_queries = self.policy.sub_queries(query);
        if sub_queries.len() > 1 {
            tracing::debug!(?sub_queries, "multi-token query, searching each token separately");
        }

        let outcomes = join_all(
            dataset_ids
                .iter()
                .map(|id| self.search_one(id, &sub_queries, limit_per_dataset)),
        )
        .await;

        let (per_dataset, failures) = dataset_ids.iter().zip(outcomes).fold(
            (Vec::new(), Vec::new()),
            |(mut ok, mut failed), (dataset_id, outcome)| {
                match outcome {
                    Ok(results) => ok.push(results),
                    Err(errors) => failed.push(DatasetFailure {
                        dataset_id: dataset_id.clone(),
                        reason: join_errors(&errors),
                    }),
                }
                (ok, failed)
            },
        );

        if per_dataset.is_empty() {
            return Err(KbError::AllDatasetsFailed(failures));
        }

        let cap = cap.unwrap_or(limit_per_dataset as usize * dataset_ids.len());
        let results = merge_ranked(per_dataset.into_iter().flatten().collect(), cap);

        tracing::info!(
            datasets = dataset_ids.len(),
            failed = failures.len(),
            results = results.len(),
            "fan-out search finished"
        );

        Ok(MergedResultSet {
            results,
            failures,
            datasets_searched: dataset_ids.len(),
            sub_queries,
        })
    }

    /// Search a single dataset, keeping the backend's own error
    ///
    /// When every sub-query fails the first error is returned as is,
    /// instead of being folded into [`KbError::AllDatasetsFailed`].
    pub async fn search_single(
        &self,
        dataset_id: &str,
        query: &str,
        limit: u32,
    ) -> KbResult<MergedResultSet> {
        check_not_blank("dataset_id", dataset_id)?;
        check_not_blank("query", query)?;
        if limit == 0 {
            return Err(KbError::invalid("limit", "must be positive"));
        }

        let sub_queries = self.policy.sub_queries(query);
        let results = match self.search_one(dataset_id, &sub_queries, limit).await {
            Ok(results) => results,
            Err(errors) => {
                return Err(errors
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| KbError::invalid("query", "no sub-queries to search")));
            }
        };

        Ok(MergedResultSet {
            results,
            failures: Vec::new(),
            datasets_searched: 1,
            sub_queries,
        })
    }

    /// All sub-queries against one dataset, merged
    async fn search_one(
        &self,
        dataset_id: &str,
        sub_queries: &[String],
        limit: u32,
    ) -> Result<Vec<SearchResult>, Vec<KbError>> {
        let calls = join_all(
            sub_queries
                .iter()
                .map(|q| self.api.search_dataset(dataset_id, q, limit)),
        )
        .await;

        let mut hits = Vec::new();
        let mut errors = Vec::new();
        for (sub_query, call) in sub_queries.iter().zip(calls) {
            match call {
                Ok(found) => hits.extend(
                    found
                        .into_iter()
                        .map(|h| SearchResult::from_hit(dataset_id, h)),
                ),
                Err(e) => {
                    tracing::warn!(dataset_id, query = %sub_query, error = %e, "dataset search failed");
                    errors.push(e);
                }
            }
        }

        if errors.len() == sub_queries.len() {
            return Err(errors);
        }

        Ok(merge_ranked(hits, limit as usize))
    }
}

fn join_errors(errors: &[KbError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Attach filename, type, size and download link to each result
///
/// Lookups run concurrently; a failed lookup leaves the fields empty.
pub async fn enrich_results(api: &dyn KnowledgeApi, results: &mut [SearchResult]) {
    let lookups = join_all(results.iter().map(|r| {
        let id = r.source_document_id.clone();
        async move {
            let (detail, link) =
                futures::join!(api.collection_detail(&id), api.download_link(&id));
            let detail = detail
                .map_err(|e| tracing::debug!(collection_id = %id, error = %e, "no collection detail"))
                .ok();
            let link = link
                .map_err(|e| tracing::debug!(collection_id = %id, error = %e, "no download link"))
                .ok()
                .flatten();
            (detail, link)
        }
    }))
    .await;

    for (result, (detail, link)) in results.iter_mut().zip(lookups) {
        result.enrich(detail.as_ref(), link);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::testing::{hit, FakeApi};
    use crate::remote::types::CollectionDetail;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sub_queries() {
        assert_eq!(
            TokenSplitPolicy::PerToken.sub_queries("  亚信 数字化  亚信 "),
            vec!["亚信", "数字化"]
        );
        assert_eq!(
            TokenSplitPolicy::WholePhrase.sub_queries(" 亚信 数字化 "),
            vec!["亚信 数字化"]
        );
        assert_eq!(TokenSplitPolicy::PerToken.sub_queries("tax"), vec!["tax"]);
    }

    #[tokio::test]
    async fn test_merged_count_is_sum_minus_duplicates() {
        let api = FakeApi::new()
            .with_search("ds-a", "policy", vec![hit("a1", 0.9, 0.5), hit("a2", 0.7, 0.5)])
            .with_search("ds-b", "policy", vec![hit("b1", 0.8, 0.5), hit("a1", 0.4, 0.5)]);

        let set = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken)
            .search(&ids(&["ds-a", "ds-b"]), "policy", 5, None)
            .await
            .unwrap();

        assert_eq!(set.results.len(), 3);
        assert!(set.failures.is_empty());
        assert_eq!(set.succeeded(), 2);
        let a1 = set
            .results
            .iter()
            .find(|r| r.source_document_id == "a1")
            .unwrap();
        assert_eq!(a1.rerank_score, Some(0.9));
        assert_eq!(a1.source_dataset_id, "ds-a");
    }

    #[tokio::test]
    async fn test_partial_failure_returns_successful_subset() {
        let api = FakeApi::new()
            .with_search("ok", "q", vec![hit("d1", 0.5, 0.5)])
            .with_failing_search("broken", "q", "HTTP 500");

        let set = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken)
            .search(&ids(&["ok", "broken"]), "q", 5, None)
            .await
            .unwrap();

        assert_eq!(set.results.len(), 1);
        assert_eq!(set.failures.len(), 1);
        assert_eq!(set.failures[0].dataset_id, "broken");
    }

    #[tokio::test]
    async fn test_all_failed_raises_aggregate() {
        let api = FakeApi::new()
            .with_failing_search("x", "q", "timeout")
            .with_failing_search("y", "q", "HTTP 502");

        let err = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken)
            .search(&ids(&["x", "y"]), "q", 5, None)
            .await
            .unwrap_err();

        match err {
            KbError::AllDatasetsFailed(failures) => {
                let failed: Vec<_> = failures.iter().map(|f| f.dataset_id.as_str()).collect();
                assert_eq!(failed, vec!["x", "y"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_results_sorted_by_rerank_then_embedding() {
        let api = FakeApi::new().with_search(
            "ds",
            "q",
            vec![
                hit("low", 0.2, 0.9),
                hit("tie-a", 0.6, 0.3),
                hit("tie-b", 0.6, 0.7),
                hit("top", 0.95, 0.1),
            ],
        );

        let set = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken)
            .search(&ids(&["ds"]), "q", 10, None)
            .await
            .unwrap();

        let order: Vec<_> = set
            .results
            .iter()
            .map(|r| r.source_document_id.as_str())
            .collect();
        assert_eq!(order, vec!["top", "tie-b", "tie-a", "low"]);
    }

    #[tokio::test]
    async fn test_multi_token_query_merges_token_results() {
        let api = FakeApi::new()
            .with_search(
                "D",
                "亚信",
                vec![hit("doc-1", 0.9, 0.8), hit("shared", 0.3, 0.2), hit("doc-2", 0.5, 0.5)],
            )
            .with_search("D", "数字化", vec![hit("shared", 0.85, 0.6), hit("doc-3", 0.4, 0.4)]);

        let set = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken)
            .search(&ids(&["D"]), "亚信 数字化", 10, None)
            .await
            .unwrap();

        assert_eq!(set.results.len(), 4);
        assert_eq!(set.sub_queries, vec!["亚信", "数字化"]);
        let shared = set
            .results
            .iter()
            .find(|r| r.source_document_id == "shared")
            .unwrap();
        assert_eq!(shared.rerank_score, Some(0.85));

        let calls = api.calls();
        assert!(calls.contains(&"search:D:亚信:10".to_string()));
        assert!(calls.contains(&"search:D:数字化:10".to_string()));
    }

    #[tokio::test]
    async fn test_whole_phrase_policy_sends_query_unchanged() {
        let api = FakeApi::new().with_search("D", "亚信 数字化", vec![hit("p", 0.5, 0.5)]);

        let set = SearchCoordinator::new(&api, TokenSplitPolicy::WholePhrase)
            .search(&ids(&["D"]), "亚信 数字化", 10, None)
            .await
            .unwrap();

        assert_eq!(set.results.len(), 1);
        assert_eq!(api.calls(), vec!["search:D:亚信 数字化:10".to_string()]);
    }

    #[tokio::test]
    async fn test_one_failing_token_does_not_fail_dataset() {
        let api = FakeApi::new()
            .with_search("D", "good", vec![hit("g", 0.5, 0.5)])
            .with_failing_search("D", "bad", "HTTP 500");

        let set = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken)
            .search(&ids(&["D"]), "good bad", 10, None)
            .await
            .unwrap();

        assert_eq!(set.results.len(), 1);
        assert!(set.failures.is_empty());
    }

    #[tokio::test]
    async fn test_single_dataset_keeps_backend_error() {
        let api = FakeApi::new()
            .with_search("ds-a", "tax", vec![hit("a1", 0.9, 0.5), hit("a2", 0.8, 0.5)])
            .with_failing_search("ds-b", "tax", "gateway down");
        let coordinator = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken);

        let set = coordinator.search_single("ds-a", "tax", 1).await.unwrap();
        assert_eq!(set.results.len(), 1);
        assert_eq!(set.datasets_searched, 1);

        let err = coordinator.search_single("ds-b", "tax", 5).await.unwrap_err();
        assert!(matches!(err, KbError::RemoteApi { ref body, .. } if body == "gateway down"));
        assert!(!err.to_string().contains("dataset searches failed"));
    }

    #[tokio::test]
    async fn test_cap_and_per_dataset_limit() {
        let hits: Vec<_> = (0..6).map(|i| hit(&format!("t{}", i), i as f64 / 10.0, 0.0)).collect();
        let api = FakeApi::new()
            .with_search("D", "a", hits.clone())
            .with_search("D", "b", hits.iter().map(|h| {
                let mut h = h.clone();
                h.collection_id = format!("{}-b", h.collection_id);
                h
            }).collect());

        let coordinator = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken);
        let set = coordinator.search(&ids(&["D"]), "a b", 3, None).await.unwrap();
        assert_eq!(set.results.len(), 3);

        let set = coordinator.search(&ids(&["D"]), "a b", 3, Some(2)).await.unwrap();
        assert_eq!(set.results.len(), 2);
    }

    #[tokio::test]
    async fn test_calls_are_issued_concurrently() {
        // The barrier only opens once all three searches are in flight
        let api = FakeApi::new()
            .with_barrier(3)
            .with_search("a", "q", vec![hit("1", 0.1, 0.1)])
            .with_search("b", "q", vec![hit("2", 0.2, 0.2)])
            .with_search("c", "q", vec![hit("3", 0.3, 0.3)]);

        let coordinator = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken);
        let set = tokio::time::timeout(
            Duration::from_secs(2),
            coordinator.search(&ids(&["a", "b", "c"]), "q", 5, None),
        )
        .await
        .expect("searches were not issued concurrently")
        .unwrap();

        assert_eq!(set.results.len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let api = FakeApi::new();
        let coordinator = SearchCoordinator::new(&api, TokenSplitPolicy::PerToken);

        assert!(matches!(
            coordinator.search(&[], "q", 5, None).await,
            Err(KbError::InvalidParameter { .. })
        ));
        assert!(matches!(
            coordinator.search(&ids(&["d"]), "  ", 5, None).await,
            Err(KbError::InvalidParameter { .. })
        ));
        assert!(matches!(
            coordinator.search(&ids(&["d"]), "q", 0, None).await,
            Err(KbError::InvalidParameter { .. })
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_enrich_results() {
        let api = FakeApi::new()
            .with_detail(CollectionDetail {
                id: "c1".to_string(),
                parent_id: None,
                dataset_id: None,
                kind: "file".to_string(),
                name: "Expense Rules.pdf".to_string(),
                file_id: None,
                raw_text_length: Some(5120),
            })
            .with_link("c1", "http://kb.local/file/c1");

        let mut results = vec![
            SearchResult::from_hit("ds", hit("c1", 0.5, 0.5)),
            SearchResult::from_hit("ds", hit("c2", 0.4, 0.4)),
        ];
        enrich_results(&api, &mut results).await;

        assert_eq!(results[0].source_filename, "Expense Rules.pdf");
        assert_eq!(results[0].download_link.as_deref(), Some("http://kb.local/file/c1"));
        assert_eq!(results[1].source_filename, "c2.pdf");
        assert_eq!(results[1].download_link, None);
        assert_eq!(results[1].document_type, None);
    }
}
