//! HTTP surface: the provider webhook plus a few read-only operator views.

pub mod status;
pub mod webhook;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::alerts::AlertDebouncer;
use crate::metrics::AppMetrics;
use crate::services::{Notifier, ServiceProber};
use crate::types::WatchedService;

use self::status::{create_status_router, StatusState};
use self::webhook::{create_webhook_router, WebhookState};

/// Shared handles the router is built from.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Vec<WatchedService>>,
    pub prober: Arc<dyn ServiceProber + Send + Sync>,
    pub notifier: Arc<dyn Notifier + Send + Sync>,
    pub alert_record: Arc<RwLock<AlertDebouncer>>,
    pub metrics: Arc<AppMetrics>,
}

/// Assemble the full router: `/health`, `/webhook`, `/status`, `/alerts`, `/metrics`.
///
/// The webhook sub-router is given no access to the alert record.
pub fn create_router(state: AppState) -> Router {
    let webhook = create_webhook_router(WebhookState {
        services: state.services.clone(),
        prober: state.prober.clone(),
        notifier: state.notifier.clone(),
        metrics: Some(state.metrics.clone()),
    });

    let status = create_status_router(StatusState {
        services: state.services,
        prober: state.prober,
        alert_record: state.alert_record,
        metrics: state.metrics,
    });

    Router::new()
        .route("/health", get(health))
        .merge(webhook)
        .merge(status)
        .layer(TraceLayer::new_for_http())
}

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        "ok",
    )
}
