//! In-process collaborators for tests: a scriptable prober and a notifier
//! that records every message instead of sending it.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::services::error::{NotifyError, ProbeError};
use crate::services::notifier::{MessageSid, Notifier};
use crate::services::prober::ServiceProber;
use crate::types::{ServiceState, WatchedService};

#[derive(Debug, Clone, Copy)]
enum Scripted {
    State(ServiceState),
    Failure,
}

/// Prober whose answers are set by the test. Unscripted services are running.
#[derive(Debug, Default)]
pub struct MockProber {
    answers: Mutex<HashMap<String, Scripted>>,
    queries: Mutex<Vec<String>>,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(self, service: &str, state: ServiceState) -> Self {
        self.set_state(service, state);
        self
    }

    pub fn with_failure(self, service: &str) -> Self {
        self.set_failure(service);
        self
    }

    /// Change a service's answer between poll cycles.
    pub fn set_state(&self, service: &str, state: ServiceState) {
        self.lock_answers().insert(service.to_string(), Scripted::State(state));
    }

    pub fn set_failure(&self, service: &str) {
        self.lock_answers().insert(service.to_string(), Scripted::Failure);
    }

    /// Service names queried so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn lock_answers(&self) -> std::sync::MutexGuard<'_, HashMap<String, Scripted>> {
        self.answers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ServiceProber for MockProber {
    async fn query_state(&self, service: &WatchedService) -> Result<ServiceState, ProbeError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(service.name().to_string());
        }
        let scripted = self.lock_answers().get(service.name()).copied();
        match scripted {
            Some(Scripted::State(state)) => Ok(state),
            Some(Scripted::Failure) => Err(ProbeError::CommandFailed {
                command: format!("mock query {}", service),
                code: 1,
                stderr: "scripted failure".to_string(),
            }),
            None => Ok(ServiceState::Running),
        }
    }

    fn prober_name(&self) -> &str {
        "mock"
    }
}

/// A message captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
}

/// Notifier that keeps every message in memory.
///
/// When built with [`RecordingNotifier::failing`] every send is rejected,
/// but the attempt is still counted.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    attempts: Mutex<usize>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Messages the provider accepted, in send order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().map(|a| *a).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, body: &str) -> Result<MessageSid, NotifyError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap_or_else(|p| p.into_inner());
            *attempts += 1;
            *attempts
        };

        if self.fail {
            return Err(NotifyError::Rejected {
                status: 503,
                code: None,
                message: "scripted failure".to_string(),
            });
        }

        self.sent
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(SentMessage {
                to: to.to_string(),
                body: body.to_string(),
            });

        Ok(format!("SM{:032}", attempt))
    }

    fn provider_name(&self) -> &str {
        "recording"
    }
}
