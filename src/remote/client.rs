//! Knowledge-base HTTP client
//!
//! Async client for the dataset API. Every call posts (or gets) JSON,
//! unwraps the `{code, message, data}` envelope and decodes `data`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::*;
use crate::config::{KnowledgeBaseConfig, SearchConfig};
use crate::core::error::{KbError, KbResult, RemoteStatus};
use crate::core::kb::KnowledgeApi;

const TREE_ENDPOINT: &str = "/api/core/dataset/list";
const SEARCH_ENDPOINT: &str = "/api/core/dataset/searchTest";
const DETAIL_ENDPOINT: &str = "/api/core/dataset/collection/detail";
const CHUNKS_ENDPOINT: &str = "/api/core/dataset/data/v2/list";
const FILE_ENDPOINT: &str = "/api/core/dataset/collection/read";

/// HTTP client for the remote knowledge base
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    search: SearchConfig,
}

impl ApiClient {
    /// Create a client from config sections
    pub fn from_config(kb: &KnowledgeBaseConfig, search: &SearchConfig) -> anyhow::Result<Self> {
        Self::new(
            &kb.base_url,
            kb.token.clone(),
            kb.request_timeout_secs,
            search.clone(),
        )
    }

    /// Create a client with explicit parameters
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
        search: SearchConfig,
    ) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
            search,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append a path to the base URL, keeping any base path prefix
    fn url(&self, path: &str) -> KbResult<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined)
            .map_err(|e| KbError::malformed(path, format!("invalid endpoint URL: {}", e)))
    }

    fn auth_header(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> KbResult<T> {
        let url = self.url(endpoint)?;
        let builder = self.auth_header(self.client.post(url)).json(body);
        self.execute(endpoint, builder).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> KbResult<T> {
        let url = self.url(endpoint)?;
        let builder = self.auth_header(self.client.get(url)).query(query);
        self.execute(endpoint, builder).await
    }

    /// Send, check status, unwrap envelope, decode `data`
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> KbResult<T> {
        tracing::debug!(endpoint, "calling knowledge-base API");

        let resp = builder.send().await.map_err(|e| KbError::RemoteApi {
            status: RemoteStatus::Unreachable,
            body: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(KbError::RemoteApi {
                status: RemoteStatus::Http(status.as_u16()),
                body,
            });
        }

        let envelope: ApiEnvelope = resp
            .json()
            .await
            .map_err(|e| KbError::malformed(endpoint, e))?;

        decode_envelope(endpoint, envelope)
    }
}

/// Turn an envelope into its payload or a remote error
fn decode_envelope<T: DeserializeOwned>(endpoint: &str, envelope: ApiEnvelope) -> KbResult<T> {
    if envelope.code != 200 {
        return Err(KbError::RemoteApi {
            status: RemoteStatus::Api(envelope.code),
            body: envelope
                .message
                .unwrap_or_else(|| "Unknown error".to_string()),
        });
    }

    serde_json::from_value(envelope.data).map_err(|e| KbError::malformed(endpoint, e))
}

#[async_trait]
impl KnowledgeApi for ApiClient {
    async fn dataset_tree(
        &self,
        parent_id: &str,
        search_value: &str,
        deep: u32,
    ) -> KbResult<Vec<DatasetNode>> {
        let req = TreeRequest {
            parent_id,
            search_value,
            deep,
        };
        self.post(TREE_ENDPOINT, &req).await
    }

    async fn search_dataset(
        &self,
        dataset_id: &str,
        text: &str,
        limit: u32,
    ) -> KbResult<Vec<SearchHit>> {
        let req = SearchRequest {
            dataset_id,
            text,
            search_mode: &self.search.mode,
            embedding_weight: self.search.embedding_weight,
            using_rerank: self.search.using_rerank,
            rerank_weight: self.search.rerank_weight,
            limit,
        };
        let payload: SearchPayload = self.post(SEARCH_ENDPOINT, &req).await?;
        Ok(payload.list)
    }

    async fn collection_detail(&self, collection_id: &str) -> KbResult<CollectionDetail> {
        self.get(DETAIL_ENDPOINT, &[("id", collection_id)]).await
    }

    async fn collection_chunks_page(
        &self,
        collection_id: &str,
        offset: u32,
        page_size: u32,
    ) -> KbResult<(Vec<DataChunk>, bool)> {
        let req = ChunkPageRequest {
            offset,
            page_size,
            collection_id,
            search_text: "",
        };
        let payload: ChunkPayload = self.post(CHUNKS_ENDPOINT, &req).await?;
        let has_more = payload.list.len() == page_size as usize;
        Ok((payload.list, has_more))
    }

    async fn collection_file(&self, collection_id: &str) -> KbResult<CollectionFile> {
        self.post(FILE_ENDPOINT, &CollectionFileRequest { collection_id })
            .await
    }

    async fn download_link(&self, collection_id: &str) -> KbResult<Option<String>> {
        let file = self.collection_file(collection_id).await?;
        if file.kind != "url" {
            return Ok(None);
        }
        if file.value.starts_with("http://") || file.value.starts_with("https://") {
            return Ok(Some(file.value));
        }
        Ok(Some(self.url(&file.value)?.to_string()))
    }
}
