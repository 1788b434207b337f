// src/error.rs
//! Error types shared by the refresh (write) path and the store.
//! HTTP-facing errors live in `api` next to their `IntoResponse` impl.

/// Failures of the snapshot store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store key {0:?}")]
    InvalidKey(String),

    #[error("stored value for {key} is not a JSON array: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of a single refresh invocation. Each carries the category key so
/// the log line alone identifies what failed.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("upstream fetch failed for {category}: {source}")]
    UpstreamFetch {
        category: String,
        #[source]
        source: FetchError,
    },

    #[error("malformed payload for {category}: {snippet:?}")]
    MalformedPayload { category: String, snippet: String },

    #[error("store write failed for {category}: {source}")]
    Store {
        category: String,
        #[source]
        source: StoreError,
    },
}

impl RefreshError {
    /// Short label used as the `kind` metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            RefreshError::UpstreamFetch { .. } => "upstream_fetch",
            RefreshError::MalformedPayload { .. } => "malformed_payload",
            RefreshError::Store { .. } => "store",
        }
    }

    pub fn category(&self) -> &str {
        match self {
            RefreshError::UpstreamFetch { category, .. }
            | RefreshError::MalformedPayload { category, .. }
            | RefreshError::Store { category, .. } => category,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("no fixture registered for {0}")]
    MissingFixture(String),
}
