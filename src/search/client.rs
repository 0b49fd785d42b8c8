//! HTTP client wrapper for an Elasticsearch-compatible search engine.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::json;

use crate::config::Config;
use crate::processing::FlatRecord;

use super::types::{BulkResponse, IndexSummary, SearchError, SearchHit, SearchResponse};

/// Documents sent per `_bulk` request.
const BULK_BATCH_SIZE: usize = 500;
/// Title matches count twice as much as content matches.
const QUERY_FIELDS: [&str; 2] = ["title^2", "content"];

/// Interface implemented by search backends that receive flattened records.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create the index if it does not exist yet.
    async fn ensure_index(&self) -> Result<(), SearchError>;

    /// Insert or replace `records`, keyed by their `id`.
    async fn upsert(&self, records: &[FlatRecord]) -> Result<IndexSummary, SearchError>;

    /// Return at most `limit` records matching `query`.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// Lightweight HTTP client for Elasticsearch.
pub struct ElasticsearchIndex {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) index: String,
    pub(crate) api_key: Option<String>,
}

impl ElasticsearchIndex {
    /// Construct a client for `index` on the engine at `base_url`.
    pub fn new(
        base_url: &str,
        index: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, SearchError> {
        let client = Client::builder().user_agent("smedocs/0.1").build()?;
        let base_url = normalize_base_url(base_url).map_err(SearchError::InvalidUrl)?;
        let index = index.into();
        tracing::debug!(
            url = %base_url,
            index = %index,
            has_api_key = api_key.as_deref().is_some_and(|value| !value.is_empty()),
            "Initialized search engine client"
        );

        Ok(Self {
            client,
            base_url,
            index,
            api_key,
        })
    }

    /// Build a client from configuration, or `None` when no engine URL is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, SearchError> {
        config
            .search_url
            .as_deref()
            .map(|url| Self::new(url, config.search_index.clone(), config.search_api_key.clone()))
            .transpose()
    }

    async fn upsert_batch(&self, batch: &[FlatRecord]) -> Result<IndexSummary, SearchError> {
        let mut body = String::new();
        for record in batch {
            body.push_str(&json!({ "index": { "_id": record.id } }).to_string());
            body.push('\n');
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }

        let response = self
            .request(Method::POST, &format!("{}/_bulk", self.index))
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SearchError::UnexpectedStatus { status, body };
            tracing::error!(index = %self.index, error = %error, "Bulk upsert failed");
            return Err(error);
        }

        let payload: BulkResponse = response.json().await?;
        let mut summary = IndexSummary::default();
        let mut failed = 0;
        let mut first_reason = None;

        for item in payload.items.into_iter().flat_map(|item| item.into_values()) {
            if let Some(error) = item.error {
                failed += 1;
                first_reason.get_or_insert_with(|| error.to_string());
                continue;
            }
            match item.result.as_deref() {
                Some("updated") => summary.updated += 1,
                _ => summary.inserted += 1,
            }
        }

        if payload.errors || failed > 0 {
            let error = SearchError::BulkRejected {
                failed,
                total: batch.len(),
                reason: first_reason.unwrap_or_else(|| "unknown".into()),
            };
            tracing::error!(index = %self.index, error = %error, "Bulk upsert partially rejected");
            return Err(error);
        }

        Ok(summary)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("authorization", format!("ApiKey {api_key}"));
        }
        req
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn ensure_index(&self) -> Result<(), SearchError> {
        let response = self.request(Method::GET, &self.index).send().await?;
        match response.status() {
            StatusCode::OK => return Ok(()),
            StatusCode::NOT_FOUND => {}
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = SearchError::UnexpectedStatus { status, body };
                tracing::error!(index = %self.index, error = %error, "Index existence check failed");
                return Err(error);
            }
        }

        let body = json!({
            "mappings": {
                "properties": {
                    "id": { "type": "keyword" },
                    "title": { "type": "text" },
                    "content": { "type": "text" },
                    "source": { "type": "keyword" }
                }
            }
        });
        let response = self
            .request(Method::PUT, &self.index)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(index = %self.index, "Index created");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && body.contains("resource_already_exists_exception") {
            tracing::debug!(index = %self.index, "Index created concurrently");
            return Ok(());
        }
        let error = SearchError::UnexpectedStatus { status, body };
        tracing::error!(index = %self.index, error = %error, "Failed to create index");
        Err(error)
    }

    async fn upsert(&self, records: &[FlatRecord]) -> Result<IndexSummary, SearchError> {
        let mut summary = IndexSummary::default();
        for batch in records.chunks(BULK_BATCH_SIZE) {
            let batch_summary = self.upsert_batch(batch).await?;
            summary.inserted += batch_summary.inserted;
            summary.updated += batch_summary.updated;
        }
        tracing::debug!(
            index = %self.index,
            inserted = summary.inserted,
            updated = summary.updated,
            "Records upserted"
        );
        Ok(summary)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let body = json!({
            "size": limit,
            "query": {
                "multi_match": {
                    "query": query,
                    "fields": QUERY_FIELDS,
                }
            }
        });

        let response = self
            .request(Method::POST, &format!("{}/_search", self.index))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(SearchError::IndexMissing(self.index.clone())),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = SearchError::UnexpectedStatus { status, body };
                tracing::error!(index = %self.index, error = %error, "Search failed");
                return Err(error);
            }
        }

        let payload: SearchResponse = response.json().await?;
        Ok(payload.hits.hits.into_iter().map(SearchHit::from).collect())
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
