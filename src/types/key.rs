//! Logical document keys and time windows

use super::error::{RegstatsError, Result};
use std::fmt;
use std::str::FromStr;

/// Time window a view is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeWindow {
    #[default]
    All,
    Year(i32),
    /// (year, month)
    Month(i32, u32),
}

/// Logical key of a fetchable document.
///
/// Displays as the path-like key used in logs and errors:
/// `country`, `country/year/{Y}`, `country/month/{Y}/{M}`, `state/{code}`,
/// `state/{code}/year/{Y}`, `state/{code}/month/{Y}/{M}`, `rto/{state}/{code}`,
/// `metadata`, `states`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    Country,
    CountryYear(i32),
    CountryMonth(i32, u32),
    State(String),
    StateYear(String, i32),
    StateMonth(String, i32, u32),
    /// (state code, RTO code)
    Rto(String, String),
    Metadata,
    StatesIndex,
}

impl DocumentKey {
    /// Key of the unfiltered document this key is derived from
    pub fn base(&self) -> DocumentKey {
        match self {
            DocumentKey::CountryYear(_) | DocumentKey::CountryMonth(..) => DocumentKey::Country,
            DocumentKey::StateYear(code, _) | DocumentKey::StateMonth(code, ..) => {
                DocumentKey::State(code.clone())
            }
            other => other.clone(),
        }
    }

    pub fn window(&self) -> TimeWindow {
        match self {
            DocumentKey::CountryYear(year) | DocumentKey::StateYear(_, year) => {
                TimeWindow::Year(*year)
            }
            DocumentKey::CountryMonth(year, month) | DocumentKey::StateMonth(_, year, month) => {
                TimeWindow::Month(*year, *month)
            }
            _ => TimeWindow::All,
        }
    }

    /// Whether the key names a country/state/RTO statistics document
    pub fn is_metrics_document(&self) -> bool {
        !matches!(self, DocumentKey::Metadata | DocumentKey::StatesIndex)
    }

    /// File name of the base document as written by the data pipeline
    pub fn file_name(&self) -> String {
        match self {
            DocumentKey::Country | DocumentKey::CountryYear(_) | DocumentKey::CountryMonth(..) => {
                "country.json".to_string()
            }
            DocumentKey::State(code)
            | DocumentKey::StateYear(code, _)
            | DocumentKey::StateMonth(code, ..) => format!("state_{}.json", code),
            DocumentKey::Rto(state, code) => format!("rto_{}_{}.json", state, code),
            DocumentKey::Metadata => "metadata.json".to_string(),
            DocumentKey::StatesIndex => "states.json".to_string(),
        }
    }

    /// Same location, restricted to `window`
    pub fn with_window(&self, window: TimeWindow) -> Result<DocumentKey> {
        let base = self.base();
        let key = match (base, window) {
            (base, TimeWindow::All) => base,
            (DocumentKey::Country, TimeWindow::Year(y)) => DocumentKey::CountryYear(y),
            (DocumentKey::Country, TimeWindow::Month(y, m)) => DocumentKey::CountryMonth(y, m),
            (DocumentKey::State(code), TimeWindow::Year(y)) => DocumentKey::StateYear(code, y),
            (DocumentKey::State(code), TimeWindow::Month(y, m)) => {
                DocumentKey::StateMonth(code, y, m)
            }
            (other, _) => {
                return Err(RegstatsError::InvalidKey(format!(
                    "'{}' has no time-scoped views",
                    other
                )))
            }
        };
        Ok(key)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKey::Country => write!(f, "country"),
            DocumentKey::CountryYear(y) => write!(f, "country/year/{}", y),
            DocumentKey::CountryMonth(y, m) => write!(f, "country/month/{}/{}", y, m),
            DocumentKey::State(code) => write!(f, "state/{}", code),
            DocumentKey::StateYear(code, y) => write!(f, "state/{}/year/{}", code, y),
            DocumentKey::StateMonth(code, y, m) => write!(f, "state/{}/month/{}/{}", code, y, m),
            DocumentKey::Rto(state, code) => write!(f, "rto/{}/{}", state, code),
            DocumentKey::Metadata => write!(f, "metadata"),
            DocumentKey::StatesIndex => write!(f, "states"),
        }
    }
}

impl FromStr for DocumentKey {
    type Err = RegstatsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RegstatsError::InvalidKey(s.to_string());
        let parts: Vec<&str> = s.trim().trim_matches('/').split('/').collect();

        let year = |raw: &str| raw.parse::<i32>().map_err(|_| invalid());
        let month = |raw: &str| {
            raw.parse::<u32>()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .ok_or_else(invalid)
        };
        let code = |raw: &str| {
            if raw.is_empty() {
                Err(invalid())
            } else {
                Ok(raw.to_string())
            }
        };

        match parts.as_slice() {
            ["country"] => Ok(DocumentKey::Country),
            ["country", "year", y] => Ok(DocumentKey::CountryYear(year(*y)?)),
            ["country", "month", y, m] => Ok(DocumentKey::CountryMonth(year(*y)?, month(*m)?)),
            ["state", c] => Ok(DocumentKey::State(code(*c)?)),
            ["state", c, "year", y] => Ok(DocumentKey::StateYear(code(*c)?, year(*y)?)),
            ["state", c, "month", y, m] => {
                Ok(DocumentKey::StateMonth(code(*c)?, year(*y)?, month(*m)?))
            }
            ["rto", st, c] => Ok(DocumentKey::Rto(code(*st)?, code(*c)?)),
            ["metadata"] => Ok(DocumentKey::Metadata),
            ["states"] => Ok(DocumentKey::StatesIndex),
            _ => Err(invalid()),
        }
    }
}
