use thiserror::Error;

/// Unified application error.
///
/// Covers everything that can stop the watchdog from starting or serving:
/// configuration, the listener socket, and the metrics registry. Probe and
/// delivery failures have their own types in [`crate::services::error`]
/// because they never escape the poll loop.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Service polling stopped unexpectedly: {0}")]
    PollerStopped(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
