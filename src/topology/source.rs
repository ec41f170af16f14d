/*!
GUI-facing topology provider interface.

This module defines:
- `TopologyError`: error type for topology retrieval.
- `TopologySource`: an async trait that returns the element set to render.

Adapters (HTTP endpoint, JSON snapshot, NetBox) implement `TopologySource` and encapsulate
how they obtain and decode data.
*/

use async_trait::async_trait;
use thiserror::Error;

use crate::network::element::Elements;

/// Error type for topology retrieval.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Transport failure (connect, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("cannot decode topology: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("NetBox: {0}")]
    Netbox(String),
}

/// Convenience result alias for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

#[async_trait]
pub trait TopologySource: Send + Sync {
    /// Human readable origin, used in log lines.
    fn describe(&self) -> String;

    async fn fetch_elements(&self) -> TopologyResult<Elements>;
}
