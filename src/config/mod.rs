// src/config/mod.rs
//! Process configuration, read once from the environment (after `.env`).

pub mod categories;

use std::path::PathBuf;
use std::str::FromStr;

use crate::ingest::scheduler::RefreshSchedulerCfg;
use crate::ingest::validate::ValidationPolicy;
use crate::store::file::DEFAULT_STORE_DIR;

pub const ENV_REFRESH_INTERVAL_SECS: &str = "EPUBS_REFRESH_INTERVAL_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "EPUBS_FETCH_TIMEOUT_SECS";
pub const ENV_VALIDATION: &str = "EPUBS_VALIDATION";
pub const ENV_STORE: &str = "EPUBS_STORE";
pub const ENV_STORE_DIR: &str = "EPUBS_STORE_DIR";
pub const ENV_WARM_ON_START: &str = "EPUBS_WARM_ON_START";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub refresh_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub validation: ValidationPolicy,
    pub store: StoreBackend,
    pub store_dir: PathBuf,
    pub warm_on_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
            fetch_timeout_secs: 30,
            validation: ValidationPolicy::Prefix,
            store: StoreBackend::File,
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            warm_on_start: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();

        let validation = match get(ENV_VALIDATION) {
            Some(raw) => ValidationPolicy::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(key = ENV_VALIDATION, value = %raw, "unknown validation policy; using prefix");
                d.validation
            }),
            None => d.validation,
        };

        let store = match get(ENV_STORE).map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "memory" => StoreBackend::Memory,
            Some(s) if s == "file" || s.is_empty() => StoreBackend::File,
            Some(other) => {
                tracing::warn!(key = ENV_STORE, value = %other, "unknown store backend; using file");
                StoreBackend::File
            }
            None => d.store,
        };

        Self {
            refresh_interval_secs: parse_or(&get, ENV_REFRESH_INTERVAL_SECS, d.refresh_interval_secs)
                .max(1),
            fetch_timeout_secs: parse_or(&get, ENV_FETCH_TIMEOUT_SECS, d.fetch_timeout_secs).max(1),
            validation,
            store,
            store_dir: get(ENV_STORE_DIR)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(d.store_dir),
            warm_on_start: get(ENV_WARM_ON_START)
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(d.warm_on_start),
        }
    }

    pub fn scheduler(&self) -> RefreshSchedulerCfg {
        RefreshSchedulerCfg {
            interval_secs: self.refresh_interval_secs,
            warm_on_start: self.warm_on_start,
        }
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unparseable config value; using default");
            default
        }),
        None => default,
    }
}
