//! Type definitions for regstats

mod document;
mod error;
mod key;
mod metrics;

pub use document::*;
pub use error::*;
pub use key::*;
pub use metrics::*;
