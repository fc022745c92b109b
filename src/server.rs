//! HTTP Server
//!
//! Exposes the descriptor and action tables, and resolves payloads posted by
//! an external poller.
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page
//! - `GET /health` - 200 while the registry is loaded
//! - `GET /descriptors` - all sensor descriptors as JSON
//! - `GET /descriptors/{key}` - one descriptor, 404 if unknown
//! - `GET /actions` - maintenance actions as JSON
//! - `POST /resolve` - resolve a payload into entities
//! - `POST /actions/{service}` - build the control request for a service call
//! - `GET /metrics` - Prometheus metrics
//!
//! # Payload snapshots
//!
//! When `entities.payload_path` is set, every `/metrics` scrape re-reads that
//! file and publishes the resolved sensor values. Nothing is kept between
//! scrapes.

use crate::config::Config;
use crate::entities::{
    ActionDescriptor, ActionRegistry, Payload, ResolvedSensor, Resolver, SensorDescriptor,
    SensorRegistry,
};
use crate::error::EntityError;
use crate::metrics::MetricsCollector;
use crate::truenas::JsonRpcRequest;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    registry: &'static SensorRegistry,
    actions: &'static ActionRegistry,
    metrics: MetricsCollector,
    request_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: &'static SensorRegistry,
        actions: &'static ActionRegistry,
    ) -> anyhow::Result<Self> {
        let metrics = MetricsCollector::new()?;
        metrics.record_registry(registry, actions);
        // Without a snapshot to read there is nothing that can fail
        if config.entities.payload_path.is_none() {
            metrics.up.set(1.0);
        }
        Ok(Self {
            config: Arc::new(config),
            registry,
            actions,
            metrics,
            request_id: Arc::new(AtomicU64::new(0)),
        })
    }

    fn resolver(&self) -> Resolver<'static> {
        Resolver::new(self.registry, self.config.entities.instance.clone())
            .with_disabled(self.config.entities.disabled_sensors.iter().cloned())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/descriptors", get(descriptors_handler))
        .route("/descriptors/{key}", get(descriptor_handler))
        .route("/actions", get(actions_handler))
        .route("/actions/{service}", post(prepare_action_handler))
        .route("/resolve", post(resolve_handler))
        .with_state(state)
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let registry = SensorRegistry::builtin()?;
    config.validate(registry)?;

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let state = AppState::new(config, registry, ActionRegistry::builtin())?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| EntityError::Server(format!("failed to bind {}: {}", addr, e)))?;

    info!("Entity server listening on {}", addr);
    info!("Descriptors available at http://{}/descriptors", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

impl IntoResponse for EntityError {
    fn into_response(self) -> Response {
        let status = match &self {
            EntityError::UnknownSensor(_) | EntityError::UnknownAction(_) => StatusCode::NOT_FOUND,
            EntityError::MissingParameter { .. }
            | EntityError::UnknownParameter { .. }
            | EntityError::ActionNotSupported { .. }
            | EntityError::MissingField { .. }
            | EntityError::InvalidPayload(_)
            | EntityError::Json(_) => StatusCode::BAD_REQUEST,
            EntityError::JobAlreadyRunning(_) | EntityError::AmbiguousEntity { .. } => {
                StatusCode::CONFLICT
            }
            EntityError::Registry(_)
            | EntityError::Config(_)
            | EntityError::Server(_)
            | EntityError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>TrueNAS Entities</title></head>
<body>
<h1>TrueNAS Entity Descriptors</h1>
<p><a href="/descriptors">Descriptors</a></p>
<p><a href="/actions">Actions</a></p>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        format!("OK ({} sensors)", state.registry.len()),
    )
}

async fn descriptors_handler(State(state): State<AppState>) -> Json<Vec<SensorDescriptor>> {
    Json(state.registry.iter().copied().collect())
}

async fn descriptor_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SensorDescriptor>, EntityError> {
    state
        .registry
        .get(&key)
        .copied()
        .map(Json)
        .ok_or(EntityError::UnknownSensor(key))
}

async fn actions_handler(State(state): State<AppState>) -> Json<Vec<ActionDescriptor>> {
    Json(state.actions.iter().copied().collect())
}

async fn resolve_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Vec<ResolvedSensor>>, EntityError> {
    let payload = Payload::from_value(body)?;
    state.metrics.resolve_requests.inc();
    Ok(Json(state.resolver().resolve_all(&payload)))
}

#[derive(Debug, Deserialize)]
struct ActionCall {
    payload: Value,
    #[serde(default)]
    params: Map<String, Value>,
}

async fn prepare_action_handler(
    State(state): State<AppState>,
    Path(service): Path<String>,
    Json(call): Json<ActionCall>,
) -> Result<Json<JsonRpcRequest>, EntityError> {
    let payload = Payload::from_value(call.payload)?;
    let request_id = state.request_id.fetch_add(1, Ordering::SeqCst);
    let request = state.actions.prepare(
        &service,
        &call.params,
        state.registry,
        &payload,
        &state.config.entities.instance,
        request_id,
    )?;
    Ok(Json(request))
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    if let Some(path) = &state.config.entities.payload_path {
        match read_snapshot(path).await {
            Ok(payload) => {
                let sensors = state.resolver().resolve_all(&payload);
                state.metrics.record_sensors(&sensors);
                state.metrics.up.set(1.0);
            }
            Err(e) => {
                warn!("Failed to read payload snapshot {}: {}", path, e);
                state.metrics.record_sensors(&[]);
                state.metrics.up.set(0.0);
            }
        }
    }

    match state.metrics.render() {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn read_snapshot(path: &str) -> Result<Payload, EntityError> {
    let text = tokio::fs::read_to_string(path).await?;
    Payload::from_json(&text)
}
