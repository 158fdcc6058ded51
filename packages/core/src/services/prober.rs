//! Service Prober
//!
//! Answers "is service X running right now?" by asking the platform's
//! service manager. Every query goes to the OS; nothing is cached.

use async_trait::async_trait;
use tokio::process::Command;

use crate::services::error::ProbeError;
use crate::types::{ServiceState, WatchedService};

/// Trait for service-state sources, so the poll loop and webhook handler
/// stay independent of the platform.
#[async_trait]
pub trait ServiceProber {
    /// Query the current state of `service`.
    async fn query_state(&self, service: &WatchedService) -> Result<ServiceState, ProbeError>;

    /// Name of this prober for logging.
    fn prober_name(&self) -> &str;
}

/// Probe `service` and report whether it is running.
///
/// Query failures are logged and reported as running, so a flaky service
/// manager never turns into an alert storm.
pub async fn is_running(
    prober: &(dyn ServiceProber + Send + Sync),
    service: &WatchedService,
) -> bool {
    match prober.query_state(service).await {
        Ok(state) => state.is_running(),
        Err(err) => {
            tracing::error!(
                service = %service,
                prober = prober.prober_name(),
                "Failed to query service status, assuming running: {}",
                err
            );
            true
        }
    }
}

/// Which service manager a [`CommandProber`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceManager {
    /// Windows Service Control Manager via `sc query`.
    WindowsSc,
    /// systemd via `systemctl show`.
    Systemd,
}

impl ServiceManager {
    /// The service manager of the platform this binary was built for.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            ServiceManager::WindowsSc
        } else {
            ServiceManager::Systemd
        }
    }

    fn program(self) -> &'static str {
        match self {
            ServiceManager::WindowsSc => "sc",
            ServiceManager::Systemd => "systemctl",
        }
    }

    fn args(self, service: &str) -> Vec<String> {
        match self {
            ServiceManager::WindowsSc => vec!["query".to_string(), service.to_string()],
            ServiceManager::Systemd => vec![
                "show".to_string(),
                "--property=LoadState,ActiveState".to_string(),
                service.to_string(),
            ],
        }
    }

    /// Interpret the command's stdout.
    pub fn parse_output(self, service: &str, stdout: &str) -> Result<ServiceState, ProbeError> {
        match self {
            ServiceManager::WindowsSc => Ok(ServiceState::from(stdout.contains("RUNNING"))),
            ServiceManager::Systemd => parse_systemctl_show(service, stdout),
        }
    }
}

fn parse_systemctl_show(service: &str, stdout: &str) -> Result<ServiceState, ProbeError> {
    let mut load_state = None;
    let mut active_state = None;

    for line in stdout.lines() {
        match line.trim().split_once('=') {
            Some(("LoadState", value)) => load_state = Some(value.trim()),
            Some(("ActiveState", value)) => active_state = Some(value.trim()),
            _ => {}
        }
    }

    if load_state == Some("not-found") {
        return Err(ProbeError::UnknownService {
            service: service.to_string(),
        });
    }

    match active_state {
        Some(state) => Ok(ServiceState::from(state == "active")),
        None => Err(ProbeError::UnrecognisedOutput {
            output: stdout.trim().to_string(),
        }),
    }
}

/// Prober that shells out to the platform service manager.
#[derive(Debug, Clone)]
pub struct CommandProber {
    manager: ServiceManager,
}

impl CommandProber {
    pub fn new(manager: ServiceManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> ServiceManager {
        self.manager
    }
}

impl Default for CommandProber {
    fn default() -> Self {
        Self::new(ServiceManager::platform_default())
    }
}

#[async_trait]
impl ServiceProber for CommandProber {
    async fn query_state(&self, service: &WatchedService) -> Result<ServiceState, ProbeError> {
        let program = self.manager.program();
        let output = Command::new(program)
            .args(self.manager.args(service.name()))
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                command: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::CommandFailed {
                command: format!("{} {}", program, self.manager.args(service.name()).join(" ")),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        self.manager.parse_output(service.name(), &stdout)
    }

    fn prober_name(&self) -> &str {
        self.manager.program()
    }
}
