// src/store/file.rs
//! Directory-backed store: `<dir>/<KEY>.json`, one file per category.
//!
//! Writes go to a sibling temp file and are renamed into place, so readers see
//! either the previous snapshot or the new one.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::SnapshotStore;
use crate::error::StoreError;
use crate::registry::is_valid_key;

pub const DEFAULT_STORE_DIR: &str = "state/snapshots";

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_err(key: &str) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await.map_err(io_err(key))?;

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value.as_bytes()).await.map_err(io_err(key))?;
        fs::rename(&tmp, &path).await.map_err(io_err(key))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStore::new(dir.path());
        let err = s.put("../escape", "[]").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }
}
