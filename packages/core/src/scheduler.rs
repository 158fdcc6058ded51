//! Service polling scheduler.
//!
//! Drives the watchdog loop: each tick probes every watched service in
//! declared order, asks the [`AlertDebouncer`] whether a stopped service may
//! be alerted on, and sends the alert before moving to the next service.
//!
//! Probe and delivery failures are logged and the cycle continues. A single
//! bad service never stops the others or future cycles.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::signal;
use tokio::sync::RwLock;
use tokio::time::{self, MissedTickBehavior};

use crate::alerts::message::down_message;
use crate::alerts::{AlertDebouncer, AlertDecision};
use crate::credentials::Recipient;
use crate::metrics::AppMetrics;
use crate::services::{deliver, is_running, Notifier, ServiceProber};
use crate::types::WatchedService;

/// Everything one poll cycle needs. Cheap to clone.
#[derive(Clone)]
pub struct ServicePoller {
    pub services: Arc<Vec<WatchedService>>,
    pub prober: Arc<dyn ServiceProber + Send + Sync>,
    pub notifier: Arc<dyn Notifier + Send + Sync>,
    pub recipient: Recipient,
    pub alert_record: Arc<RwLock<AlertDebouncer>>,
    pub metrics: Option<Arc<AppMetrics>>,
}

/// What happened during one cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub down: Vec<WatchedService>,
    pub alerted: Vec<WatchedService>,
    pub suppressed: Vec<WatchedService>,
    pub delivery_failures: usize,
}

impl ServicePoller {
    /// Execute a single poll cycle at `now`.
    ///
    /// The alert record is only locked for the decision and the update,
    /// never across a probe or a send.
    pub async fn poll_once(&self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport::default();

        for service in self.services.iter() {
            report.checked += 1;
            let running = is_running(self.prober.as_ref(), service).await;

            let decision = self.alert_record.read().await.evaluate(service, running, now);

            match decision {
                AlertDecision::Healthy => {
                    tracing::debug!(service = %service, "Service running");
                }
                AlertDecision::Suppressed { next_allowed_at } => {
                    report.down.push(service.clone());
                    report.suppressed.push(service.clone());
                    tracing::info!(
                        service = %service,
                        next_allowed_at = %next_allowed_at,
                        "Service still not running, alert suppressed"
                    );
                }
                AlertDecision::Alert => {
                    report.down.push(service.clone());
                    tracing::warn!(
                        service = %service,
                        "Service not running. Sending alert to {}",
                        self.recipient
                    );

                    let delivered = deliver(
                        self.notifier.as_ref(),
                        self.recipient.as_str(),
                        &down_message(service),
                    )
                    .await;
                    if !delivered {
                        report.delivery_failures += 1;
                    }

                    // The attempt counts for the cool-down whether or not
                    // the provider accepted it.
                    self.alert_record.write().await.record_alert(service, now);
                    report.alerted.push(service.clone());
                }
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.polls_total.inc();
            metrics.services_down.set(report.down.len() as f64);
            metrics.alerts_sent_total.inc_by(report.alerted.len() as f64);
            metrics.alerts_suppressed_total.inc_by(report.suppressed.len() as f64);
            metrics.delivery_failures_total.inc_by(report.delivery_failures as f64);
        }

        report
    }
}

/// Run the service polling loop.
///
/// The first cycle runs immediately, then one every `poll_interval`. Missed
/// ticks are not caught up. Runs until `Ctrl+C` (SIGINT) is received.
pub async fn run_service_polling(poller: ServicePoller, poll_interval: Duration) {
    let mut interval = time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        "Service polling started (interval: {}s, services: {})",
        poll_interval.as_secs(),
        poller.services.len()
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = poller.poll_once(Utc::now()).await;
                tracing::debug!(
                    "Poll cycle finished: {} checked, {} down, {} alerted, {} suppressed",
                    report.checked,
                    report.down.len(),
                    report.alerted.len(),
                    report.suppressed.len(),
                );
            }

            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received. Stopping polling.");
                break;
            }
        }
    }

    tracing::info!("Service polling stopped cleanly");
}
