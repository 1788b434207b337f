// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod query;
pub mod registry;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::registry::{Category, Registry};
pub use crate::store::{Publication, SnapshotStore};

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::api::AppState;
use crate::config::{AppConfig, StoreBackend};
use crate::ingest::fetch::HttpFetcher;
use crate::ingest::Refresher;
use crate::query::QueryService;
use crate::store::{FileStore, MemoryStore};

const DEFAULT_LOG_FILTER: &str = "epubs_cache=info,refresh=info,query=info,warn";

/// Install a `tracing` subscriber honoring `RUST_LOG`; `LOG_FORMAT=json` switches
/// to JSON lines. A no-op when the hosting runtime already installed one.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed; keeping it");
    }
}

/// Wired application: the HTTP router plus the refresher the timer drives.
pub struct App {
    pub router: Router,
    pub refresher: Refresher,
}

/// Build store, fetcher, refresher and router from configuration.
pub fn build_app(cfg: &AppConfig, registry: Registry) -> anyhow::Result<App> {
    let registry = Arc::new(registry);

    let store: Arc<dyn SnapshotStore> = match cfg.store {
        StoreBackend::File => Arc::new(FileStore::new(cfg.store_dir.clone())),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(cfg.fetch_timeout_secs))?);

    let refresher =
        Refresher::new(registry.clone(), fetcher, store.clone()).with_policy(cfg.validation);
    let query = QueryService::new(registry, store);

    let router = api::router(AppState::new(query, refresher.clone()));
    Ok(App { router, refresher })
}
