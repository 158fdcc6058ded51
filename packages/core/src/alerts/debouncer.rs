//! Alert debouncer.
//!
//! Remembers, per service, when the last proactive alert was sent, and
//! decides whether a stopped service may be alerted on again. There is no
//! notion of "recovered": a running service simply leaves its entry alone,
//! so a service that flaps inside one cool-down window is alerted once.
//!
//! Only the poll loop writes to the debouncer. It is shared as
//! `Arc<RwLock<AlertDebouncer>>` so read-only views can observe it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::types::WatchedService;

/// Outcome of evaluating one service in one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    /// Service is running; nothing to do.
    Healthy,
    /// Service is down and the cool-down has elapsed (or it was never alerted).
    Alert,
    /// Service is down but an alert went out too recently.
    Suppressed { next_allowed_at: DateTime<Utc> },
}

/// Last alert time of one service, as exposed by `GET /alerts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRecordEntry {
    pub service: WatchedService,
    pub last_alert_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AlertDebouncer {
    cooldown: Duration,
    last_alert_sent: HashMap<WatchedService, DateTime<Utc>>,
}

impl AlertDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_alert_sent: HashMap::new(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether an alert for `service` may be sent at `now`.
    ///
    /// A clock that went backwards counts as still inside the window.
    pub fn can_send_alert(&self, service: &WatchedService, now: DateTime<Utc>) -> bool {
        match self.last_alert_sent.get(service) {
            None => true,
            Some(last) => now.signed_duration_since(*last) >= self.cooldown,
        }
    }

    /// Apply the transition rule for one probe result.
    pub fn evaluate(&self, service: &WatchedService, running: bool, now: DateTime<Utc>) -> AlertDecision {
        if running {
            return AlertDecision::Healthy;
        }
        if self.can_send_alert(service, now) {
            return AlertDecision::Alert;
        }
        let last = self.last_alert_sent[service];
        AlertDecision::Suppressed {
            next_allowed_at: last
                .checked_add_signed(self.cooldown)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Record that an alert for `service` was attempted at `at`.
    pub fn record_alert(&mut self, service: &WatchedService, at: DateTime<Utc>) {
        self.last_alert_sent.insert(service.clone(), at);
    }

    pub fn last_alert(&self, service: &WatchedService) -> Option<DateTime<Utc>> {
        self.last_alert_sent.get(service).copied()
    }

    /// All recorded alerts, ordered by service name.
    pub fn snapshot(&self) -> Vec<AlertRecordEntry> {
        let mut entries: Vec<_> = self
            .last_alert_sent
            .iter()
            .map(|(service, at)| AlertRecordEntry {
                service: service.clone(),
                last_alert_at: *at,
            })
            .collect();
        entries.sort_by(|a, b| a.service.cmp(&b.service));
        entries
    }

    pub fn len(&self) -> usize {
        self.last_alert_sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_alert_sent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn svc(name: &str) -> WatchedService {
        WatchedService::new(name)
    }

    fn ten_minutes() -> AlertDebouncer {
        AlertDebouncer::new(Duration::minutes(10))
    }

    #[test]
    fn never_alerted_service_may_alert() {
        let debouncer = ten_minutes();
        assert!(debouncer.can_send_alert(&svc("A"), t0()));
        assert_eq!(debouncer.evaluate(&svc("A"), false, t0()), AlertDecision::Alert);
    }

    #[test]
    fn running_service_is_healthy_regardless_of_history() {
        let mut debouncer = ten_minutes();
        assert_eq!(debouncer.evaluate(&svc("A"), true, t0()), AlertDecision::Healthy);

        debouncer.record_alert(&svc("A"), t0());
        let later = t0() + Duration::minutes(1);
        assert_eq!(debouncer.evaluate(&svc("A"), true, later), AlertDecision::Healthy);
        assert_eq!(debouncer.last_alert(&svc("A")), Some(t0()));
    }

    #[test]
    fn alert_inside_cooldown_is_suppressed() {
        let mut debouncer = ten_minutes();
        debouncer.record_alert(&svc("A"), t0());

        let decision = debouncer.evaluate(&svc("A"), false, t0() + Duration::minutes(5));

        assert_eq!(
            decision,
            AlertDecision::Suppressed {
                next_allowed_at: t0() + Duration::minutes(10)
            }
        );
    }

    #[test]
    fn alert_allowed_once_cooldown_has_elapsed() {
        let mut debouncer = ten_minutes();
        debouncer.record_alert(&svc("A"), t0());

        assert!(!debouncer.can_send_alert(&svc("A"), t0() + Duration::seconds(599)));
        assert!(debouncer.can_send_alert(&svc("A"), t0() + Duration::minutes(10)));
        assert!(debouncer.can_send_alert(&svc("A"), t0() + Duration::minutes(11)));
    }

    #[test]
    fn clock_going_backwards_stays_suppressed() {
        let mut debouncer = ten_minutes();
        debouncer.record_alert(&svc("A"), t0());
        assert!(!debouncer.can_send_alert(&svc("A"), t0() - Duration::hours(1)));
    }

    #[test]
    fn cooldown_past_the_calendar_end_stays_suppressed() {
        let mut debouncer = AlertDebouncer::new(Duration::seconds(10_000_000_000_000));
        debouncer.record_alert(&svc("A"), t0());

        for minutes in [5, 10, 15] {
            let decision = debouncer.evaluate(&svc("A"), false, t0() + Duration::minutes(minutes));
            assert_eq!(
                decision,
                AlertDecision::Suppressed {
                    next_allowed_at: DateTime::<Utc>::MAX_UTC
                }
            );
        }
    }

    #[test]
    fn services_are_debounced_independently() {
        let mut debouncer = ten_minutes();
        debouncer.record_alert(&svc("A"), t0());
        assert!(debouncer.can_send_alert(&svc("B"), t0()));
    }

    #[test]
    fn flapping_service_gets_one_alert_per_window() {
        let mut debouncer = ten_minutes();
        let mut alerts = 0;
        // down, up, down, up, down at two-minute steps, all inside one window
        for (step, running) in [false, true, false, true, false].into_iter().enumerate() {
            let now = t0() + Duration::minutes(2 * step as i64);
            if debouncer.evaluate(&svc("A"), running, now) == AlertDecision::Alert {
                debouncer.record_alert(&svc("A"), now);
                alerts += 1;
            }
        }
        assert_eq!(alerts, 1);
    }

    #[test]
    fn snapshot_is_sorted_by_service() {
        let mut debouncer = ten_minutes();
        debouncer.record_alert(&svc("redis"), t0());
        debouncer.record_alert(&svc("nginx"), t0() + Duration::minutes(1));

        let snapshot = debouncer.snapshot();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].service.name(), "nginx");
        assert_eq!(snapshot[1].service.name(), "redis");
    }

    #[test]
    fn record_overwrites_previous_entry() {
        let mut debouncer = ten_minutes();
        debouncer.record_alert(&svc("A"), t0());
        debouncer.record_alert(&svc("A"), t0() + Duration::minutes(10));
        assert_eq!(debouncer.len(), 1);
        assert_eq!(debouncer.last_alert(&svc("A")), Some(t0() + Duration::minutes(10)));
    }

    proptest! {
        /// N consecutive down cycles yield floor((N-1)*interval/cooldown) + 1 alerts.
        #[test]
        fn steady_failure_alert_count_follows_rate_limit(
            cycles in 1u32..200,
            interval_secs in 1i64..3_600,
            multiple in 2i64..8,
        ) {
            let interval = Duration::seconds(interval_secs);
            let cooldown = Duration::seconds(interval_secs * multiple);
            let mut debouncer = AlertDebouncer::new(cooldown);
            let service = svc("A");
            let mut alerts: i64 = 0;

            for cycle in 0..cycles {
                let now = t0() + interval * cycle as i32;
                if debouncer.evaluate(&service, false, now) == AlertDecision::Alert {
                    debouncer.record_alert(&service, now);
                    alerts += 1;
                }
            }

            let expected = (i64::from(cycles) - 1) * interval_secs / (interval_secs * multiple) + 1;
            prop_assert_eq!(alerts, expected);
        }

        #[test]
        fn running_service_never_alerts(cycles in 1u32..100, history in proptest::option::of(0i64..10_000)) {
            let mut debouncer = ten_minutes();
            if let Some(offset) = history {
                debouncer.record_alert(&svc("A"), t0() - Duration::seconds(offset));
            }
            for cycle in 0..cycles {
                let now = t0() + Duration::minutes(5) * cycle as i32;
                prop_assert_eq!(debouncer.evaluate(&svc("A"), true, now), AlertDecision::Healthy);
            }
        }
    }
}
