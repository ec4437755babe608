//! Runtime configuration
//!
//! Read from the environment first, then overridden by command-line flags.

use crate::services::{DirSource, DocumentSource, HttpSource};
use crate::types::{RegstatsError, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "REGSTATS_BASE_URL";
pub const ENV_DATA_DIR: &str = "REGSTATS_DATA_DIR";
pub const ENV_TIMEOUT_SECS: &str = "REGSTATS_TIMEOUT_SECS";

/// Directory used when neither a base URL nor a data directory is given
pub const DEFAULT_DATA_DIR: &str = "data";

/// HTTP request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where documents come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Http { base_url: String },
    Dir { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: SourceConfig,
    /// Per-request timeout for HTTP sources; `None` disables it
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::Dir {
                path: PathBuf::from(DEFAULT_DATA_DIR),
            },
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build from a variable lookup. A base URL wins over a data directory.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.source = SourceConfig::Dir {
                path: PathBuf::from(dir),
            };
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.source = SourceConfig::Http {
                base_url: validate_base_url(&url)?,
            };
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(&raw)?;
        }

        Ok(config)
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        data_dir: Option<PathBuf>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        if let Some(path) = data_dir {
            self.source = SourceConfig::Dir { path };
        }
        if let Some(url) = base_url {
            self.source = SourceConfig::Http {
                base_url: validate_base_url(&url)?,
            };
        }
        if let Some(secs) = timeout_secs {
            self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(self)
    }

    /// Construct the document source this configuration describes
    pub fn build_source(&self) -> Result<Arc<dyn DocumentSource>> {
        match &self.source {
            SourceConfig::Http { base_url } => {
                let source = HttpSource::new(base_url.clone(), self.timeout)
                    .map_err(|e| RegstatsError::Config(format!("HTTP client error: {}", e)))?;
                Ok(Arc::new(source))
            }
            SourceConfig::Dir { path } => Ok(Arc::new(DirSource::new(path.clone()))),
        }
    }
}

fn validate_base_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(RegstatsError::Config(format!(
            "base URL must start with http:// or https://: {}",
            url
        )))
    }
}

/// "0" disables the timeout
fn parse_timeout(raw: &str) -> Result<Option<Duration>> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| RegstatsError::Config(format!("invalid {}: {}", ENV_TIMEOUT_SECS, raw)))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
