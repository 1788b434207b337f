// src/ingest/mod.rs
//! Write path: fetch → extract → validate → store, one category at a time.

pub mod extract;
pub mod fetch;
pub mod scheduler;
pub mod validate;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::error::RefreshError;
use crate::registry::{Category, Registry};
use crate::store::SnapshotStore;
use extract::{BracketExtractor, PayloadExtractor};
use fetch::Fetcher;
use validate::{snippet, ValidationPolicy};

const SNIPPET_CHARS: usize = 200;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("refresh_runs_total", "Refresh invocations started.");
        describe_counter!(
            "refresh_success_total",
            "Refreshes that wrote a new snapshot."
        );
        describe_counter!(
            "refresh_failures_total",
            "Refreshes aborted, labelled by failure kind."
        );
        describe_histogram!("refresh_fetch_ms", "Upstream fetch time in milliseconds.");
        describe_gauge!(
            "refresh_last_success_ts",
            "Unix ts of the last successful snapshot write."
        );
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub category: String,
    pub bytes: usize,
}

/// Everything one refresh needs. Cheap to clone; holds no rotation state.
#[derive(Clone)]
pub struct Refresher {
    registry: Arc<Registry>,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn SnapshotStore>,
    extractor: Arc<dyn PayloadExtractor>,
    policy: ValidationPolicy,
}

impl Refresher {
    pub fn new(
        registry: Arc<Registry>,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            store,
            extractor: Arc::new(BracketExtractor),
            policy: ValidationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn PayloadExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Refresh the category owning `tick_ms`'s rotation slot.
    /// `Ok(None)` when the registry is empty.
    pub async fn refresh_for_tick(
        &self,
        tick_ms: i64,
    ) -> Result<Option<RefreshOutcome>, RefreshError> {
        let Some(category) = self.registry.select_for_tick(tick_ms) else {
            tracing::warn!(target: "refresh", tick_ms, "registry is empty; nothing to refresh");
            return Ok(None);
        };
        tracing::debug!(target: "refresh", tick_ms, category = %category.key, "tick selected category");
        self.refresh_category(category).await.map(Some)
    }

    /// Fetch, validate and unconditionally overwrite one category's snapshot.
    pub async fn refresh_category(
        &self,
        category: &Category,
    ) -> Result<RefreshOutcome, RefreshError> {
        ensure_metrics_described();
        counter!("refresh_runs_total").increment(1);

        let result = self.refresh_inner(category).await;
        match &result {
            Ok(out) => {
                counter!("refresh_success_total").increment(1);
                gauge!("refresh_last_success_ts").set(chrono::Utc::now().timestamp() as f64);
                tracing::info!(
                    target: "refresh",
                    category = %out.category,
                    bytes = out.bytes,
                    "snapshot stored"
                );
            }
            Err(e) => {
                counter!("refresh_failures_total", "kind" => e.kind()).increment(1);
                tracing::error!(
                    target: "refresh",
                    category = %e.category(),
                    kind = e.kind(),
                    error = %e,
                    "refresh failed; previous snapshot left untouched"
                );
            }
        }
        result
    }

    async fn refresh_inner(&self, category: &Category) -> Result<RefreshOutcome, RefreshError> {
        let payload = self.fetch_validated(category).await?;
        self.store
            .put(&category.key, &payload)
            .await
            .map_err(|source| RefreshError::Store {
                category: category.key.clone(),
                source,
            })?;
        Ok(RefreshOutcome {
            category: category.key.clone(),
            bytes: payload.len(),
        })
    }

    /// Fetch and extract a category's payload without touching the store.
    pub async fn fetch_validated(&self, category: &Category) -> Result<String, RefreshError> {
        let t0 = Instant::now();
        let raw = self
            .fetcher
            .fetch_raw(&category.url)
            .await
            .map_err(|source| RefreshError::UpstreamFetch {
                category: category.key.clone(),
                source,
            })?;
        histogram!("refresh_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let payload = self.extractor.extract(&raw);
        if !self.policy.is_valid(payload) {
            // Report what the page looked like, not the (possibly empty) extraction.
            let shown = if payload.is_empty() { raw.as_str() } else { payload };
            return Err(RefreshError::MalformedPayload {
                category: category.key.clone(),
                snippet: snippet(shown, SNIPPET_CHARS),
            });
        }
        Ok(payload.to_string())
    }

    /// Refresh every category once, in registry order. Failures are isolated.
    pub async fn warm_all(&self) -> Vec<Result<RefreshOutcome, RefreshError>> {
        let mut out = Vec::with_capacity(self.registry.len());
        for c in self.registry.iter() {
            out.push(self.refresh_category(c).await);
        }
        out
    }
}
