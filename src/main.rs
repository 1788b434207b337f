//! e-Publishing snapshot cache — Binary Entrypoint
//! Boots the Axum HTTP server and the round-robin refresh timer.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use epubs_cache::config::{categories::load_registry_default, AppConfig};
use epubs_cache::ingest::scheduler::spawn_refresh_scheduler;
use epubs_cache::metrics::Metrics;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    epubs_cache::init_tracing();

    let cfg = AppConfig::from_env();
    let registry = load_registry_default().context("loading category registry")?;
    let categories = registry.len();
    tracing::info!(
        categories,
        interval_secs = cfg.refresh_interval_secs,
        validation = ?cfg.validation,
        store = ?cfg.store,
        "starting epubs-cache"
    );

    let app = epubs_cache::build_app(&cfg, registry)?;

    // Timer trigger: one category per tick, chosen from the tick time.
    spawn_refresh_scheduler(cfg.scheduler(), app.refresher.clone());

    let router = match Metrics::init(categories) {
        Ok(m) => app.router.merge(m.router()),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics recorder not installed; /metrics disabled");
            app.router
        }
    };

    Ok(router.into())
}
