//! Core domain types shared by the prober, the poll loop and the API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A service name included in the fixed monitoring set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchedService(String);

impl WatchedService {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WatchedService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WatchedService {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Result of a single probe. Derived on every query, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Running,
    Stopped,
}

impl ServiceState {
    pub fn is_running(self) -> bool {
        matches!(self, ServiceState::Running)
    }
}

impl From<bool> for ServiceState {
    fn from(running: bool) -> Self {
        if running {
            ServiceState::Running
        } else {
            ServiceState::Stopped
        }
    }
}

/// Build the watched-service list from raw names, preserving declared order.
///
/// Blank names are skipped and repeated names keep their first position.
pub fn watched_services<I, S>(names: I) -> Vec<WatchedService>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut services: Vec<WatchedService> = Vec::new();
    for raw in names {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        if services.iter().any(|s| s.name() == name) {
            tracing::warn!(service = %name, "Duplicate watched service ignored");
            continue;
        }
        services.push(WatchedService::new(name));
    }
    services
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watched_services_keeps_declared_order() {
        let services = watched_services(["nginx", "postgresql", "redis"]);
        let names: Vec<_> = services.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["nginx", "postgresql", "redis"]);
    }

    #[test]
    fn watched_services_drops_blanks_and_duplicates() {
        let services = watched_services([" nginx ", "", "nginx", "  ", "redis"]);
        let names: Vec<_> = services.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["nginx", "redis"]);
    }

    #[test]
    fn state_from_bool() {
        assert_eq!(ServiceState::from(true), ServiceState::Running);
        assert!(!ServiceState::from(false).is_running());
    }

    #[test]
    fn watched_service_serializes_as_plain_string() {
        let json = serde_json::to_string(&WatchedService::new("sshd")).unwrap();
        assert_eq!(json, "\"sshd\"");
    }
}
