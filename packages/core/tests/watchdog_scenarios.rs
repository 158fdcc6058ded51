//! End-to-end watchdog scenarios driven through the public API with
//! explicit cycle timestamps.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::RwLock;

use service_watchdog::{
    alerts::AlertDebouncer,
    api::webhook::{reply_with_status, WebhookState},
    credentials::Recipient,
    scheduler::ServicePoller,
    services::mock::{MockProber, RecordingNotifier},
    types::{ServiceState, WatchedService},
};

const OPERATOR: &str = "+5511999999999";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

fn services(names: &[&str]) -> Arc<Vec<WatchedService>> {
    Arc::new(names.iter().map(|n| WatchedService::new(*n)).collect())
}

fn poller(
    names: &[&str],
    prober: Arc<MockProber>,
    notifier: Arc<RecordingNotifier>,
    cooldown: Duration,
) -> ServicePoller {
    ServicePoller {
        services: services(names),
        prober,
        notifier,
        recipient: Recipient::parse(OPERATOR).unwrap(),
        alert_record: Arc::new(RwLock::new(AlertDebouncer::new(cooldown))),
        metrics: None,
    }
}

#[tokio::test]
async fn three_cycles_alert_suppress_alert() {
    let prober = Arc::new(
        MockProber::new()
            .with_state("A", ServiceState::Stopped)
            .with_state("B", ServiceState::Running),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let poller = poller(&["A", "B"], prober, notifier.clone(), Duration::minutes(10));
    let a = WatchedService::new("A");

    // Cycle 1: alert for A only.
    let report = poller.poll_once(t0()).await;
    assert_eq!(report.alerted, vec![a.clone()]);
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(poller.alert_record.read().await.last_alert(&a), Some(t0()));

    // Cycle 2: five minutes later, still inside the cool-down.
    let report = poller.poll_once(t0() + Duration::minutes(5)).await;
    assert_eq!(report.suppressed, vec![a.clone()]);
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(poller.alert_record.read().await.last_alert(&a), Some(t0()));

    // Cycle 3: ten minutes after the first alert.
    let report = poller.poll_once(t0() + Duration::minutes(10)).await;
    assert_eq!(report.alerted, vec![a.clone()]);
    assert_eq!(notifier.sent().len(), 2);
    assert_eq!(
        poller.alert_record.read().await.last_alert(&a),
        Some(t0() + Duration::minutes(10))
    );
    assert!(poller
        .alert_record
        .read()
        .await
        .last_alert(&WatchedService::new("B"))
        .is_none());
}

#[tokio::test]
async fn steady_failure_over_an_hour_alerts_every_ten_minutes() {
    let prober = Arc::new(MockProber::new().with_state("A", ServiceState::Stopped));
    let notifier = Arc::new(RecordingNotifier::new());
    let poller = poller(&["A"], prober, notifier.clone(), Duration::minutes(10));

    // 13 cycles at five-minute spacing: t0 .. t0+60min
    for cycle in 0..13 {
        poller.poll_once(t0() + Duration::minutes(5 * cycle)).await;
    }

    // floor((13 - 1) * 5 / 10) + 1
    assert_eq!(notifier.sent().len(), 7);
}

#[tokio::test]
async fn recovery_does_not_reset_cooldown() {
    let prober = Arc::new(MockProber::new().with_state("A", ServiceState::Stopped));
    let notifier = Arc::new(RecordingNotifier::new());
    let poller = poller(&["A"], prober.clone(), notifier.clone(), Duration::minutes(10));

    poller.poll_once(t0()).await;
    prober.set_state("A", ServiceState::Running);
    poller.poll_once(t0() + Duration::minutes(3)).await;
    prober.set_state("A", ServiceState::Stopped);
    poller.poll_once(t0() + Duration::minutes(6)).await;

    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn status_query_replies_in_declared_order_and_ignores_debounce_state() {
    let prober = Arc::new(
        MockProber::new()
            .with_state("A", ServiceState::Stopped)
            .with_state("B", ServiceState::Running),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    // Put A inside its cool-down first; the status reply must still mention it.
    let poller = poller(&["A", "B"], prober.clone(), notifier.clone(), Duration::minutes(10));
    poller.poll_once(t0()).await;
    let record_before = poller.alert_record.read().await.snapshot();

    let state = WebhookState {
        services: services(&["A", "B"]),
        prober,
        notifier: notifier.clone(),
        metrics: None,
    };
    let delivered = reply_with_status(&state, OPERATOR).await;

    assert_eq!(delivered, 2);
    let sent = notifier.sent();
    // one proactive alert plus two replies
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1].to, OPERATOR);
    assert!(sent[1].body.contains("Service A is not running"));
    assert_eq!(sent[2].to, OPERATOR);
    assert!(sent[2].body.contains("Service B is running"));
    assert_eq!(poller.alert_record.read().await.snapshot(), record_before);
}
