// src/api.rs
//! HTTP surface.
//!
//! - `GET /` (and any unrouted path): all cached publications, or one MAJCOM
//!   with `?majcom=<name>`
//! - `GET /static`: same as `/`
//! - `GET /live?majcom=<name>`: fetch upstream now, fall back to the snapshot
//! - `GET /categories`: the registry in rotation order
//! - `GET /health`

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics::counter;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::error::StoreError;
use crate::ingest::Refresher;
use crate::query::{Lookup, QueryError, QueryService};
use crate::registry::majcom_key;

pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// Diagnostic header on 404s: `unregistered` or `uncached`.
pub const CATEGORY_STATUS_HEADER: &str = "x-category-status";
/// Which copy `/live` answered with: `live` or `cache`.
pub const SNAPSHOT_SOURCE_HEADER: &str = "x-snapshot-source";

/// Live payloads shorter than this are treated as a degraded upstream page.
pub const LIVE_MIN_BYTES: usize = 1000;

#[derive(Clone)]
pub struct AppState {
    pub query: QueryService,
    pub refresher: Refresher,
}

impl AppState {
    pub fn new(query: QueryService, refresher: Refresher) -> Self {
        Self { query, refresher }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(cached_snapshot))
        .route("/static", get(cached_snapshot))
        .route("/live", get(live_snapshot))
        .route("/categories", get(list_categories))
        .route("/health", get(|| async { "OK" }))
        .fallback(cached_snapshot)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct SnapshotParams {
    #[serde(default)]
    majcom: Option<String>,
}

impl SnapshotParams {
    fn selector(&self) -> Option<&str> {
        self.majcom
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {}", .0.key())]
    NotFound(Lookup),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::NotFound(lookup) => ApiError::NotFound(lookup),
            QueryError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(format!("{e}\n{e:?}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(lookup) => {
                tracing::debug!(
                    target: "query",
                    key = %lookup.key(),
                    status = lookup.status_label(),
                    "category not found"
                );
                let mut resp = json_response(StatusCode::NOT_FOUND, String::new());
                resp.headers_mut().insert(
                    CATEGORY_STATUS_HEADER,
                    HeaderValue::from_static(lookup.status_label()),
                );
                resp
            }
            ApiError::BadRequest(msg) => text_response(StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(detail) => {
                tracing::error!(target: "query", error = %detail, "uncaught error");
                text_response(StatusCode::INTERNAL_SERVER_ERROR, detail)
            }
        }
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body,
    )
        .into_response()
}

fn text_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE))],
        body,
    )
        .into_response()
}

fn to_json_body<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Internal(format!("serialize: {e}")))
}

async fn cached_snapshot(
    State(state): State<AppState>,
    Query(params): Query<SnapshotParams>,
) -> Result<Response, ApiError> {
    match params.selector() {
        Some(name) => {
            counter!("query_requests_total", "kind" => "category").increment(1);
            let body = state.query.read_majcom(name).await?;
            Ok(json_response(StatusCode::OK, body))
        }
        None => {
            counter!("query_requests_total", "kind" => "all").increment(1);
            let all = state.query.read_all().await?;
            Ok(json_response(StatusCode::OK, to_json_body(&all)?))
        }
    }
}

async fn live_snapshot(
    State(state): State<AppState>,
    Query(params): Query<SnapshotParams>,
) -> Result<Response, ApiError> {
    counter!("query_requests_total", "kind" => "live").increment(1);
    let Some(name) = params.selector() else {
        return Err(ApiError::BadRequest("majcom parameter is required".into()));
    };
    let key = majcom_key(name);
    let Some(category) = state.query.registry().get(&key) else {
        return Err(ApiError::NotFound(Lookup::Unregistered(key)));
    };

    match state.refresher.fetch_validated(category).await {
        Ok(payload) if payload.len() >= LIVE_MIN_BYTES => {
            tracing::info!(target: "query", category = %key, "responding with live data");
            return Ok(with_source(json_response(StatusCode::OK, payload), "live"));
        }
        Ok(payload) => {
            tracing::info!(
                target: "query",
                category = %key,
                bytes = payload.len(),
                "live payload too short; responding with cached data"
            );
        }
        Err(e) => {
            tracing::warn!(target: "query", category = %key, error = %e, "live fetch failed; responding with cached data");
        }
    }

    let body = state.query.read_key(&key).await?;
    Ok(with_source(json_response(StatusCode::OK, body), "cache"))
}

fn with_source(mut resp: Response, source: &'static str) -> Response {
    resp.headers_mut()
        .insert(SNAPSHOT_SOURCE_HEADER, HeaderValue::from_static(source));
    resp
}

async fn list_categories(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = to_json_body(&state.query.registry().categories())?;
    Ok(json_response(StatusCode::OK, body))
}
