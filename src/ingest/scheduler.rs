// src/ingest/scheduler.rs
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ingest::Refresher;

#[derive(Clone, Copy, Debug)]
pub struct RefreshSchedulerCfg {
    pub interval_secs: u64,
    /// Refresh every category once before the first tick.
    pub warm_on_start: bool,
}

impl Default for RefreshSchedulerCfg {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            warm_on_start: false,
        }
    }
}

/// Milliseconds since the Unix epoch, the tick value the rotation is derived from.
pub fn now_tick_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Spawn the timer trigger. Each tick refreshes exactly one category, chosen
/// from the wall-clock tick alone; errors are logged inside the refresher and
/// never stop the loop.
pub fn spawn_refresh_scheduler(cfg: RefreshSchedulerCfg, refresher: Refresher) -> JoinHandle<()> {
    tokio::spawn(async move {
        if cfg.warm_on_start {
            let results = refresher.warm_all().await;
            let ok = results.iter().filter(|r| r.is_ok()).count();
            tracing::info!(
                target: "refresh",
                ok,
                failed = results.len() - ok,
                "warm-up pass finished"
            );
        }

        let period = Duration::from_secs(cfg.interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let tick_ms = now_tick_ms();
            // Failure is already logged and counted by the refresher.
            let _ = refresher.refresh_for_tick(tick_ms).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fetch::FixtureFetcher;
    use crate::registry::{Category, Registry};
    use crate::store::{MemoryStore, SnapshotStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn warm_start_populates_before_first_tick() {
        let registry = Registry::new(vec![
            Category::new("A", "https://a.example/"),
            Category::new("B", "https://b.example/"),
        ])
        .unwrap();
        let fetcher = FixtureFetcher::new()
            .with_page("https://a.example/", r#"[{"PubID":"a"}]"#)
            .with_page("https://b.example/", r#"[{"PubID":"b"}]"#);
        let store = Arc::new(MemoryStore::new());
        let refresher = Refresher::new(Arc::new(registry), Arc::new(fetcher), store.clone());

        let handle = spawn_refresh_scheduler(
            RefreshSchedulerCfg {
                interval_secs: 3600,
                warm_on_start: true,
            },
            refresher,
        );

        for _ in 0..50 {
            if store.len().await == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(store.get("A").await.unwrap().as_deref(), Some(r#"[{"PubID":"a"}]"#));
        assert_eq!(store.get("B").await.unwrap().as_deref(), Some(r#"[{"PubID":"b"}]"#));
    }
}
