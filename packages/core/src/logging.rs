use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Directives used when `RUST_LOG` is unset or unparseable.
///
/// Request spans from `TraceLayer` are emitted at debug, and the HTTP client
/// stack is quiet unless something goes wrong.
pub const DEFAULT_DIRECTIVES: &str = "info,tower_http=debug,hyper=warn,reqwest=warn";

/// Build the log filter from a `RUST_LOG`-style string.
pub fn build_filter(raw: Option<&str>) -> EnvFilter {
    raw.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging() {
    let raw = std::env::var("RUST_LOG").ok();

    fmt()
        .with_env_filter(build_filter(raw.as_deref()))
        .with_target(false)
        .compact()
        .init();

    info!("Logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_rust_log_uses_watchdog_defaults() {
        let filter = build_filter(None).to_string();
        assert!(filter.contains("tower_http=debug"));
        assert!(filter.contains("hyper=warn"));
    }

    #[test]
    fn rust_log_overrides_defaults() {
        let filter = build_filter(Some("service_watchdog=trace")).to_string();
        assert!(filter.contains("service_watchdog=trace"));
        assert!(!filter.contains("hyper=warn"));
    }
}
