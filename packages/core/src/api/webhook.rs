//! Inbound query endpoint.
//!
//! The messaging provider POSTs every message the operator sends as a
//! form-encoded body with `From` and `Body` fields. A body of `status`
//! (any letter case) is answered with one message per watched service;
//! anything else is accepted and ignored.
//!
//! This path probes live and never touches the alert record: its state
//! type does not carry it.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Form, Router};
use serde::Deserialize;

use crate::alerts::message::status_message;
use crate::metrics::AppMetrics;
use crate::services::{deliver, is_running, Notifier, ServiceProber};
use crate::types::{ServiceState, WatchedService};

/// Keyword that triggers a status reply.
pub const STATUS_KEYWORD: &str = "status";

#[derive(Clone)]
pub struct WebhookState {
    pub services: Arc<Vec<WatchedService>>,
    pub prober: Arc<dyn ServiceProber + Send + Sync>,
    pub notifier: Arc<dyn Notifier + Send + Sync>,
    pub metrics: Option<Arc<AppMetrics>>,
}

/// Provider callback fields. Missing fields are read as empty.
#[derive(Debug, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

impl InboundMessage {
    pub fn is_status_request(&self) -> bool {
        self.body.to_lowercase() == STATUS_KEYWORD
    }
}

pub fn create_webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .with_state(state)
}

/// `POST /webhook`: answer `status` requests, ignore everything else.
pub async fn handle_webhook(
    State(state): State<WebhookState>,
    Form(message): Form<InboundMessage>,
) -> StatusCode {
    tracing::info!(from = %message.from, "Message received: {}", message.body);

    if !message.is_status_request() {
        return StatusCode::OK;
    }

    if message.from.is_empty() {
        tracing::warn!("Status request without a sender address ignored");
        return StatusCode::OK;
    }

    reply_with_status(&state, &message.from).await;
    StatusCode::OK
}

/// Probe every watched service and send one reply per service to `to`.
///
/// Returns the number of replies the provider accepted.
pub async fn reply_with_status(state: &WebhookState, to: &str) -> usize {
    let mut delivered = 0;

    for service in state.services.iter() {
        let running = is_running(state.prober.as_ref(), service).await;
        let text = status_message(service, ServiceState::from(running));
        if deliver(state.notifier.as_ref(), to, &text).await {
            delivered += 1;
        } else if let Some(metrics) = &state.metrics {
            metrics.delivery_failures_total.inc();
        }
    }

    if let Some(metrics) = &state.metrics {
        metrics.status_queries_total.inc();
    }

    delivered
}
