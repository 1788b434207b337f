// src/registry.rs
//! Category registry: the fixed, ordered list of upstream publication sources.
//!
//! Order is significant. The refresh scheduler derives the category to refresh
//! from the tick timestamp and the position in this list, so the registry is
//! built once at startup and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Width of one rotation slot in milliseconds.
pub const ROTATION_SLOT_MS: i64 = 60_000;

const MAJCOM_KEY_PREFIX: &str = "MAJCOM_";
const MAJCOM_KEY_SUFFIX: &str = "_ALL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Category {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    categories: Vec<Category>,
}

impl Registry {
    /// Build a registry, rejecting blank fields, keys a store cannot hold, and
    /// duplicate keys.
    pub fn new(categories: Vec<Category>) -> Result<Self, RegistryError> {
        {
            let mut seen = std::collections::HashSet::with_capacity(categories.len());
            for (idx, c) in categories.iter().enumerate() {
                if c.key.trim().is_empty() {
                    return Err(RegistryError::EmptyKey(idx));
                }
                if !is_valid_key(&c.key) {
                    return Err(RegistryError::InvalidKey(c.key.clone()));
                }
                if c.url.trim().is_empty() {
                    return Err(RegistryError::EmptyUrl(c.key.clone()));
                }
                if !seen.insert(c.key.as_str()) {
                    return Err(RegistryError::DuplicateKey(c.key.clone()));
                }
            }
        }
        Ok(Self { categories })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Index of the category owning the rotation slot that `tick_ms` falls in.
    ///
    /// `floor(tick_ms / 60000) mod len`, using Euclidean arithmetic so
    /// timestamps before the epoch still land in `0..len`.
    pub fn index_for_tick(&self, tick_ms: i64) -> Option<usize> {
        rotation_index(tick_ms, self.categories.len())
    }

    pub fn select_for_tick(&self, tick_ms: i64) -> Option<&Category> {
        self.index_for_tick(tick_ms).and_then(|i| self.categories.get(i))
    }
}

pub fn rotation_index(tick_ms: i64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let slot = tick_ms.div_euclid(ROTATION_SLOT_MS);
    let idx = slot.rem_euclid(len as i64);
    usize::try_from(idx).ok()
}

/// Keys double as snapshot file names: ASCII alphanumerics, `_` and `-` only.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Store key for a user-supplied MAJCOM selector: `acc` → `MAJCOM_ACC_ALL`.
pub fn majcom_key(name: &str) -> String {
    format!(
        "{MAJCOM_KEY_PREFIX}{}{MAJCOM_KEY_SUFFIX}",
        name.trim().to_ascii_uppercase()
    )
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("category #{0} has an empty key")]
    EmptyKey(usize),
    #[error("category key {0:?} may only contain ASCII letters, digits, '_' and '-'")]
    InvalidKey(String),
    #[error("category {0} has an empty url")]
    EmptyUrl(String),
    #[error("duplicate category key {0}")]
    DuplicateKey(String),
}
