//! Operator read endpoints
//!
//! - `GET /status`: live probe of every watched service
//! - `GET /alerts`: last alert time per service, from the alert record
//! - `GET /metrics`: Prometheus text exposition

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::alerts::{AlertDebouncer, AlertRecordEntry};
use crate::metrics::{AppMetrics, CONTENT_TYPE};
use crate::services::{is_running, ServiceProber};
use crate::types::WatchedService;

#[derive(Clone)]
pub struct StatusState {
    pub services: Arc<Vec<WatchedService>>,
    pub prober: Arc<dyn ServiceProber + Send + Sync>,
    pub alert_record: Arc<RwLock<AlertDebouncer>>,
    pub metrics: Arc<AppMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub service: WatchedService,
    pub running: bool,
}

pub fn create_status_router(state: StatusState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/alerts", get(get_alert_record))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

/// Probe every watched service now, in declared order.
async fn get_status(State(state): State<StatusState>) -> Json<Vec<ServiceStatus>> {
    let mut statuses = Vec::with_capacity(state.services.len());
    for service in state.services.iter() {
        statuses.push(ServiceStatus {
            service: service.clone(),
            running: is_running(state.prober.as_ref(), service).await,
        });
    }
    Json(statuses)
}

async fn get_alert_record(State(state): State<StatusState>) -> Json<Vec<AlertRecordEntry>> {
    let record = state.alert_record.read().await;
    Json(record.snapshot())
}

async fn get_metrics(
    State(state): State<StatusState>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let body = state.metrics.render().map_err(|err| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("Failed to render metrics: {}", err) })),
        )
    })?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CONTENT_TYPE)
        .body(Body::from(body))
        .expect("metrics response should be valid"))
}
