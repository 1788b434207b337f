// src/store/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SnapshotStore;
use crate::error::StoreError;

/// In-process store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.read().await.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_overwrites_and_get_json_decodes() {
        let s = MemoryStore::new();
        assert!(s.get("A").await.unwrap().is_none());
        assert!(s.get_json("A").await.unwrap().is_none());

        s.put("A", r#"[{"PubID":1}]"#).await.unwrap();
        s.put("A", r#"[{"PubID":2},{"PubID":3}]"#).await.unwrap();

        let v = s.get_json("A").await.unwrap().unwrap();
        assert_eq!(v, vec![json!({"PubID":2}), json!({"PubID":3})]);
        assert_eq!(s.len().await, 1);
    }

    #[tokio::test]
    async fn get_json_reports_undecodable_value() {
        let s = MemoryStore::new();
        s.put("A", r#"[{"PubID":1},"#).await.unwrap();
        let err = s.get_json("A").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { key, .. } if key == "A"));
    }
}
