//! Prometheus metrics registry for the watchdog.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it
//! to the poll loop and the webhook handler.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{Counter, Gauge, Opts, Registry};

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Completed poll cycles.
    pub polls_total: Counter,
    /// Proactive alerts handed to the notifier.
    pub alerts_sent_total: Counter,
    /// Alerts withheld because the service was still in its cool-down.
    pub alerts_suppressed_total: Counter,
    /// Messages the provider rejected or never received.
    pub delivery_failures_total: Counter,
    /// Inbound `status` requests answered.
    pub status_queries_total: Counter,
    /// Watched services found not running in the latest cycle.
    pub services_down: Gauge,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let polls_total = Counter::with_opts(Opts::new(
            "service_watchdog_polls_total",
            "Completed poll cycles",
        ))?;

        let alerts_sent_total = Counter::with_opts(Opts::new(
            "service_watchdog_alerts_sent_total",
            "Proactive alerts sent to the operator",
        ))?;

        let alerts_suppressed_total = Counter::with_opts(Opts::new(
            "service_watchdog_alerts_suppressed_total",
            "Alerts suppressed by the cool-down",
        ))?;

        let delivery_failures_total = Counter::with_opts(Opts::new(
            "service_watchdog_delivery_failures_total",
            "Messages the provider failed to accept",
        ))?;

        let status_queries_total = Counter::with_opts(Opts::new(
            "service_watchdog_status_queries_total",
            "Inbound status queries answered",
        ))?;

        let services_down = Gauge::with_opts(Opts::new(
            "service_watchdog_services_down",
            "Watched services not running in the latest poll cycle",
        ))?;

        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(alerts_sent_total.clone()))?;
        registry.register(Box::new(alerts_suppressed_total.clone()))?;
        registry.register(Box::new(delivery_failures_total.clone()))?;
        registry.register(Box::new(status_queries_total.clone()))?;
        registry.register(Box::new(services_down.clone()))?;

        Ok(Self {
            polls_total,
            alerts_sent_total,
            alerts_suppressed_total,
            delivery_failures_total,
            status_queries_total,
            services_down,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}
