//! Document loading service
//!
//! Serves every document request through the cache:
//! - Base keys (`country`, `state/{code}`, `rto/{state}/{code}`) are fetched
//!   from the source once and parsed.
//! - Year and month views of country/state documents are derived from the
//!   cached base document with the time filters, never fetched separately.
//!
//! Fetches run on their own task, so a fetch that has started still lands in
//! the cache when the caller that triggered it is dropped.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::services::filter::filter_document;
use crate::services::normalizer::unrecognized_entries;
use crate::services::source::DocumentSource;
use crate::services::DocumentCache;
use crate::types::{
    DatasetMetadata, DocumentKey, MetricsDocument, RegstatsError, Result, StatesIndex, TimeWindow,
};

pub struct DocumentLoader {
    source: Arc<dyn DocumentSource>,
    documents: DocumentCache<Arc<MetricsDocument>>,
    metadata: DocumentCache<Arc<DatasetMetadata>>,
    states_index: DocumentCache<Arc<StatesIndex>>,
}

impl DocumentLoader {
    /// Create a loader with empty caches around `source`
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            documents: DocumentCache::new(),
            metadata: DocumentCache::new(),
            states_index: DocumentCache::new(),
        }
    }

    /// Load a statistics document, or a time-scoped view of one
    pub async fn load(&self, key: &DocumentKey) -> Result<Arc<MetricsDocument>> {
        if !key.is_metrics_document() {
            return Err(RegstatsError::InvalidKey(format!(
                "'{}' is not a statistics document",
                key
            )));
        }

        match key.window() {
            TimeWindow::All => self.load_base(key).await,
            window => {
                self.documents
                    .get_or_try_load(key, async {
                        let base = self.load_base(&key.base()).await?;
                        tracing::debug!(%key, "deriving time-scoped view");
                        Ok(Arc::new(filter_document(&base, window)))
                    })
                    .await
            }
        }
    }

    /// Load `key` restricted to `window` (e.g., the year view of a state)
    pub async fn load_window(
        &self,
        key: &DocumentKey,
        window: TimeWindow,
    ) -> Result<Arc<MetricsDocument>> {
        self.load(&key.with_window(window)?).await
    }

    /// Dataset metadata (`metadata.json`)
    pub async fn load_metadata(&self) -> Result<Arc<DatasetMetadata>> {
        let key = DocumentKey::Metadata;
        let load = fetch_json(Arc::clone(&self.source), key.clone());
        self.metadata.get_or_spawn_load(&key, load).await
    }

    /// State code → document file mapping (`states.json`)
    pub async fn load_states_index(&self) -> Result<Arc<StatesIndex>> {
        let key = DocumentKey::StatesIndex;
        let load = fetch_json(Arc::clone(&self.source), key.clone());
        self.states_index.get_or_spawn_load(&key, load).await
    }

    /// Number of documents and derived views held in the cache
    pub async fn cached_documents(&self) -> u64 {
        self.documents.len().await
    }

    async fn load_base(&self, key: &DocumentKey) -> Result<Arc<MetricsDocument>> {
        if let Some(doc) = self.documents.get(key).await {
            tracing::debug!(%key, "document cache hit");
            return Ok(doc);
        }

        let load = fetch_document(Arc::clone(&self.source), key.clone());
        self.documents.get_or_spawn_load(key, load).await
    }
}

async fn fetch_document(
    source: Arc<dyn DocumentSource>,
    key: DocumentKey,
) -> Result<Arc<MetricsDocument>> {
    let bytes = fetch(source.as_ref(), &key).await?;
    let doc: MetricsDocument = parse_json(&key, bytes)?;

    let unrecognized = unrecognized_entries(doc.metrics());
    if unrecognized > 0 {
        tracing::warn!(
            %key,
            unrecognized,
            "document has series in an unrecognized shape; counting them as zero"
        );
    }

    tracing::info!(%key, level = ?doc.level(), name = doc.name(), "loaded document");
    Ok(Arc::new(doc))
}

async fn fetch_json<T>(source: Arc<dyn DocumentSource>, key: DocumentKey) -> Result<Arc<T>>
where
    T: DeserializeOwned,
{
    let bytes = fetch(source.as_ref(), &key).await?;
    Ok(Arc::new(parse_json(&key, bytes)?))
}

async fn fetch(source: &dyn DocumentSource, key: &DocumentKey) -> Result<Vec<u8>> {
    source.fetch(key).await.map_err(|e| {
        tracing::warn!(%key, source = source.name(), error = %e, "document fetch failed");
        RegstatsError::from(e)
    })
}

fn parse_json<T: DeserializeOwned>(key: &DocumentKey, mut bytes: Vec<u8>) -> Result<T> {
    simd_json::from_slice(&mut bytes).map_err(|e| RegstatsError::Parse {
        key: key.to_string(),
        message: e.to_string(),
    })
}
