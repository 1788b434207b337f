// src/query.rs
//! Read path: single-category lookups and the aggregated all-categories view.

use std::sync::Arc;

use futures::future::join_all;
use metrics::counter;

use crate::error::StoreError;
use crate::registry::{majcom_key, Registry};
use crate::store::{Publication, SnapshotStore};

/// Why a single-category read came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The selector does not form a key that is in the registry.
    Unregistered(String),
    /// Registered, but no snapshot has been stored yet.
    NotCached(String),
}

impl Lookup {
    pub fn key(&self) -> &str {
        match self {
            Lookup::Unregistered(k) | Lookup::NotCached(k) => k,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            Lookup::Unregistered(_) => "unregistered",
            Lookup::NotCached(_) => "uncached",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("no snapshot for {}", .0.key())]
    NotFound(Lookup),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct QueryService {
    registry: Arc<Registry>,
    store: Arc<dyn SnapshotStore>,
}

impl QueryService {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn SnapshotStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Stored array text for a MAJCOM selector such as `acc`.
    pub async fn read_majcom(&self, selector: &str) -> Result<String, QueryError> {
        self.read_key(&majcom_key(selector)).await
    }

    pub async fn read_key(&self, key: &str) -> Result<String, QueryError> {
        if !self.registry.contains(key) {
            return Err(QueryError::NotFound(Lookup::Unregistered(key.to_string())));
        }
        match self.store.get(key).await? {
            Some(text) => Ok(text),
            None => Err(QueryError::NotFound(Lookup::NotCached(key.to_string()))),
        }
    }

    /// Concatenate every cached snapshot in registry order.
    ///
    /// Reads run concurrently and are joined once. Missing categories add
    /// nothing; a value that no longer decodes is logged and skipped. Any other
    /// store failure fails the whole read.
    pub async fn read_all(&self) -> Result<Vec<Publication>, StoreError> {
        let reads = self.registry.iter().map(|c| self.store.get_json(&c.key));
        let results = join_all(reads).await;

        let mut merged = Vec::new();
        for result in results {
            match result {
                Ok(Some(mut records)) => merged.append(&mut records),
                Ok(None) => {}
                Err(StoreError::Decode { key, source }) => {
                    counter!("query_decode_errors_total").increment(1);
                    tracing::warn!(
                        target: "query",
                        category = %key,
                        error = %source,
                        "stored snapshot does not decode; skipping"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(merged)
    }
}
