//! Knowledge service coordinating extraction, the persisted store, chunking, and search.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    config::Config,
    extraction::{ExtractionSettings, LayoutReader, PdfLayoutReader, extract_directory},
    metrics::{IngestMetrics, MetricsSnapshot},
    processing::{
        chunking::chunk_records,
        flatten::{FlatRecord, flatten_sections, flatten_store},
        types::{RebuildOutcome, ServiceError, SubmissionOutcome},
    },
    search::{ElasticsearchIndex, IndexSummary, SearchHit, SearchIndex, render_context},
    store::{GlobalStore, Sections, USER_INPUT_SOURCE, load_store, write_store},
};

/// Tunables the service needs, independent of the process-global configuration.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Heading classifier settings applied to every document.
    pub settings: ExtractionSettings,
    /// Word budget for free-text submissions.
    pub chunk_words: usize,
    /// Location of the persisted store.
    pub store_path: PathBuf,
    /// Hits returned per query.
    pub result_limit: usize,
}

impl ServiceOptions {
    /// Derive options from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            settings: config.extraction_settings(),
            chunk_words: config.chunk_words,
            store_path: config.store_path.clone(),
            result_limit: config.search_result_limit,
        }
    }
}

/// Owns the global heading store and routes every mutation through a single writer.
///
/// Directory rebuilds replace the PDF-derived headings and keep submitted chunk records;
/// submissions append chunk records. Both persist the complete store before returning. Construct once and share through an `Arc`.
pub struct KnowledgeService {
    options: ServiceOptions,
    store: Mutex<GlobalStore>,
    reader: Arc<dyn LayoutReader>,
    index: Option<Box<dyn SearchIndex>>,
    metrics: Arc<IngestMetrics>,
}

impl KnowledgeService {
    /// Build the service from configuration with the PDF reader and, when configured,
    /// the Elasticsearch adapter.
    pub fn load(config: &Config) -> Result<Self, ServiceError> {
        let index = ElasticsearchIndex::from_config(config)?
            .map(|index| Box::new(index) as Box<dyn SearchIndex>);
        if index.is_none() {
            tracing::info!("No search engine configured; indexing disabled");
        }
        Self::open(
            ServiceOptions::from_config(config),
            Arc::new(PdfLayoutReader::new()),
            index,
        )
    }

    /// Build the service from explicit components, loading any persisted store.
    pub fn open(
        options: ServiceOptions,
        reader: Arc<dyn LayoutReader>,
        index: Option<Box<dyn SearchIndex>>,
    ) -> Result<Self, ServiceError> {
        let store = load_store(&options.store_path)?;
        tracing::info!(
            path = %options.store_path.display(),
            headings = store.len(),
            "Loaded heading store"
        );
        Ok(Self {
            options,
            store: Mutex::new(store),
            reader,
            index,
            metrics: Arc::new(IngestMetrics::new()),
        })
    }

    /// Re-extract every PDF in `dir` and replace the PDF-derived part of the store.
    ///
    /// Headings from the previous store are dropped, so headings of removed documents
    /// disappear. Chunk records from free-text submissions are merged back after the
    /// extracted headings, keeping the store in step with what was already indexed.
    pub async fn rebuild_from_directory(&self, dir: &Path) -> Result<RebuildOutcome, ServiceError> {
        tracing::info!(dir = %dir.display(), "Rebuilding heading store");
        let reader = Arc::clone(&self.reader);
        let settings = self.options.settings;
        let dir = dir.to_path_buf();
        let report =
            tokio::task::spawn_blocking(move || extract_directory(reader.as_ref(), &dir, &settings))
                .await??;

        let documents_processed = report.processed.len();
        let documents_skipped = report.skipped.len();
        let headings = report.store.len();
        let mut rebuilt = report.store;

        let submissions_kept = {
            let mut store = self.store.lock().await;
            let submissions: Sections = std::mem::take(&mut *store)
                .into_sections()
                .into_iter()
                .filter(|(_, record)| record.source == USER_INPUT_SOURCE)
                .collect();
            let kept = rebuilt.merge(submissions).inserted;
            *store = rebuilt;
            write_store(&self.options.store_path, &store).await?;
            kept
        };

        let outcome = RebuildOutcome {
            documents_processed,
            documents_skipped,
            headings,
            submissions_kept,
        };
        self.metrics.record_rebuild(
            outcome.documents_processed as u64,
            outcome.documents_skipped as u64,
            outcome.headings as u64,
        );
        tracing::info!(
            processed = outcome.documents_processed,
            skipped = outcome.documents_skipped,
            headings = outcome.headings,
            submissions_kept = outcome.submissions_kept,
            path = %self.options.store_path.display(),
            "Heading store rebuilt"
        );
        Ok(outcome)
    }

    /// Chunk a free-text submission, append it to the store, and index the new records.
    pub async fn submit_text(
        &self,
        title: &str,
        content: &str,
    ) -> Result<SubmissionOutcome, ServiceError> {
        let records = chunk_records(title, content, self.options.chunk_words)?;
        let chunk_ids: Vec<String> = records.keys().cloned().collect();
        let flat = flatten_sections(&records);

        {
            let mut store = self.store.lock().await;
            store.merge(records);
            write_store(&self.options.store_path, &store).await?;
        }
        self.metrics.record_submission(chunk_ids.len() as u64);

        let indexed = match &self.index {
            Some(index) => {
                index.ensure_index().await?;
                let IndexSummary { inserted, updated } = index.upsert(&flat).await?;
                inserted + updated
            }
            None => 0,
        };

        tracing::info!(title, chunks = chunk_ids.len(), indexed, "Submission stored");
        Ok(SubmissionOutcome { chunk_ids, indexed })
    }

    /// Push the whole flattened store to the search engine.
    pub async fn index_documents(&self) -> Result<IndexSummary, ServiceError> {
        let index = self.search_index()?;
        let records = self.records().await;
        index.ensure_index().await?;
        let summary = index.upsert(&records).await?;
        tracing::info!(
            records = records.len(),
            inserted = summary.inserted,
            updated = summary.updated,
            "Store indexed"
        );
        Ok(summary)
    }

    /// Return the configured number of best hits for `text`.
    pub async fn query(&self, text: &str) -> Result<Vec<SearchHit>, ServiceError> {
        let index = self.search_index()?;
        let hits = index.search(text, self.options.result_limit).await?;
        tracing::debug!(query = text, hits = hits.len(), "Query answered");
        Ok(hits)
    }

    /// Query and render the hits as a context block.
    pub async fn query_context(&self, text: &str) -> Result<String, ServiceError> {
        Ok(render_context(&self.query(text).await?))
    }

    /// Flattened snapshot of the current store.
    pub async fn records(&self) -> Vec<FlatRecord> {
        flatten_store(&*self.store.lock().await)
    }

    /// Number of top-level entries in the store.
    pub async fn heading_count(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Retrieve the current metrics snapshot for diagnostics.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn search_index(&self) -> Result<&dyn SearchIndex, ServiceError> {
        self.index.as_deref().ok_or(ServiceError::SearchDisabled)
    }
}
