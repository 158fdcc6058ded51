//! Error types for the external collaborators (service manager, messaging
//! provider). Neither ever escapes the poll loop or the webhook handler.

use thiserror::Error;

/// Errors from querying the OS service manager.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with status {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Unknown service: {service}")]
    UnknownService { service: String },

    #[error("Unrecognised service manager output: {output}")]
    UnrecognisedOutput { output: String },
}

/// Errors from the messaging provider.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Provider rejected message (HTTP {status}, code {code:?}): {message}")]
    Rejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("Response format error: {message}")]
    Format { message: String },
}

impl NotifyError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format { message: message.into() }
    }
}
