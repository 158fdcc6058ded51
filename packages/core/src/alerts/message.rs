use crate::types::{ServiceState, WatchedService};

/// Text sent when a watched service is not running.
pub fn down_message(service: &WatchedService) -> String {
    format!("*Alert*:\nService {} is not running.", service)
}

/// Text sent in reply to a status query for a running service.
pub fn running_message(service: &WatchedService) -> String {
    format!("*Status*:\nService {} is running.", service)
}

/// Reply text for a live status query.
pub fn status_message(service: &WatchedService, state: ServiceState) -> String {
    match state {
        ServiceState::Running => running_message(service),
        ServiceState::Stopped => down_message(service),
    }
}
