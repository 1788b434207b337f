use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the registry size.
    pub fn init(registry_len: usize) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!(
            "query_requests_total",
            "Read requests served, labelled by kind (all/category/live)."
        );
        describe_counter!(
            "query_decode_errors_total",
            "Stored snapshots skipped because they no longer decode."
        );
        describe_gauge!("registry_categories", "Number of categories in the rotation.");
        gauge!("registry_categories").set(registry_len as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
