use thiserror::Error;

/// A document could not be fetched: non-success response or transport failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load document '{}'{}: {}", .key, status_suffix(.status), .cause)]
pub struct DocumentLoadError {
    /// Logical key of the requested document (e.g. `state/KA`)
    pub key: String,
    /// HTTP-like status code, when the source produced one
    pub status: Option<u16>,
    pub cause: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

impl DocumentLoadError {
    pub fn with_status(key: impl ToString, status: u16, cause: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            status: Some(status),
            cause: cause.into(),
        }
    }

    pub fn transport(key: impl ToString, cause: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            status: None,
            cause: cause.into(),
        }
    }
}

/// regstats error types
///
/// Cloneable so a single failed in-flight load can be handed to every
/// caller that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegstatsError {
    /// Fetching a document failed
    #[error(transparent)]
    DocumentLoad(#[from] DocumentLoadError),

    /// A fetched document was not valid JSON for its kind
    #[error("parse error in '{key}': {message}")]
    Parse { key: String, message: String },

    /// A logical document key could not be parsed or used
    #[error("invalid document key: {0}")]
    InvalidKey(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// A background load task panicked or was cancelled by the runtime
    #[error("load task for '{key}' failed: {message}")]
    Task { key: String, message: String },
}

/// Result type alias for regstats
pub type Result<T> = std::result::Result<T, RegstatsError>;
