// src/store/mod.rs
//! Snapshot store: one JSON-array text value per category key.
//!
//! Every write fully replaces the key's value; there is no read-modify-write.
//! A missing key is `Ok(None)`, never an error.

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Opaque upstream record. Only the `PubID` field is ever inspected.
pub type Publication = serde_json::Value;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Like `get`, decoded into the stored record sequence.
    async fn get_json(&self, key: &str) -> Result<Option<Vec<Publication>>, StoreError> {
        match self.get(key).await? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }
}
