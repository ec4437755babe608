//! Document sources
//!
//! A source turns a [`DocumentKey`] into raw document bytes. It knows nothing
//! about caching or parsing; the loader layers both on top.

use crate::types::{DocumentKey, DocumentLoadError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Fetch a JSON document by key
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Short name for logs (e.g., "http", "dir")
    fn name(&self) -> &str;

    /// Fetch the raw bytes of the document behind `key`.
    /// Time-scoped keys are never passed here; the loader derives them.
    async fn fetch(&self, key: &DocumentKey) -> Result<Vec<u8>, DocumentLoadError>;
}

/// Fetches documents over HTTP from a static file host
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// `timeout` bounds each request; `None` leaves requests unbounded
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, key: &DocumentKey) -> String {
        format!("{}/{}", self.base_url, key.file_name())
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, key: &DocumentKey) -> Result<Vec<u8>, DocumentLoadError> {
        let url = self.url_for(key);
        tracing::debug!(%key, %url, "fetching document");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DocumentLoadError::transport(key, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocumentLoadError::with_status(
                key,
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DocumentLoadError::transport(key, format!("failed to read body: {}", e)))?;
        Ok(body.to_vec())
    }
}

/// Reads documents from a local directory laid out like the static host
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &DocumentKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

#[async_trait]
impl DocumentSource for DirSource {
    fn name(&self) -> &str {
        "dir"
    }

    async fn fetch(&self, key: &DocumentKey) -> Result<Vec<u8>, DocumentLoadError> {
        let path = self.path_for(key);
        tracing::debug!(%key, path = %path.display(), "reading document");

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                DocumentLoadError::with_status(key, 404, format!("{} not found", path.display()))
            }
            _ => DocumentLoadError::transport(key, format!("{}: {}", path.display(), e)),
        })
    }
}
