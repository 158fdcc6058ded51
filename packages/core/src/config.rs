use std::env;
use std::time::Duration;

use crate::cli::Cli;
use crate::credentials::RawCredentials;
use crate::error::AppError;
use crate::services::twilio::{DEFAULT_API_URL, DEFAULT_SENDER};
use crate::types::{watched_services, WatchedService};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 300;
pub const DEFAULT_ALERT_COOLDOWN_SECONDS: u64 = 600;
/// Thirty days.
pub const MAX_ALERT_COOLDOWN_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub services: Vec<WatchedService>,
    pub listen_port: u16,
    pub poll_interval_seconds: u64,
    pub alert_cooldown_seconds: u64,
    pub twilio_api_url: String,
    pub sender: String,
    pub credentials: RawCredentials,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let services = non_empty("WATCHDOG_SERVICES")
            .map(|raw| watched_services(raw.split(',')))
            .unwrap_or_default();

        let listen_port = parse_or(non_empty("WATCHDOG_PORT"), "WATCHDOG_PORT", DEFAULT_PORT)?;
        let poll_interval_seconds = parse_or(
            non_empty("POLL_INTERVAL_SECONDS"),
            "POLL_INTERVAL_SECONDS",
            DEFAULT_POLL_INTERVAL_SECONDS,
        )?;
        let alert_cooldown_seconds = parse_or(
            non_empty("ALERT_COOLDOWN_SECONDS"),
            "ALERT_COOLDOWN_SECONDS",
            DEFAULT_ALERT_COOLDOWN_SECONDS,
        )?;

        Ok(Self {
            services,
            listen_port,
            poll_interval_seconds,
            alert_cooldown_seconds,
            twilio_api_url: non_empty("TWILIO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            sender: non_empty("TWILIO_FROM").unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            credentials: RawCredentials {
                recipient: non_empty("WATCHDOG_RECIPIENT"),
                account_sid: non_empty("TWILIO_ACCOUNT_SID"),
                auth_token: non_empty("TWILIO_AUTH_TOKEN"),
            },
        })
    }

    /// Command-line flags take precedence over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if !cli.services.is_empty() {
            self.services = watched_services(&cli.services);
        }
        if let Some(port) = cli.port {
            self.listen_port = port;
        }
        if let Some(interval) = cli.poll_interval {
            self.poll_interval_seconds = interval;
        }
        if let Some(cooldown) = cli.cooldown {
            self.alert_cooldown_seconds = cooldown;
        }
        if let Some(from) = &cli.from {
            self.sender = from.clone();
        }
        if let Some(recipient) = &cli.recipient {
            self.credentials.recipient = Some(recipient.clone());
        }
        if let Some(sid) = &cli.account_sid {
            self.credentials.account_sid = Some(sid.clone());
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.services.is_empty() {
            return Err(AppError::config(
                "at least one service is required (WATCHDOG_SERVICES or --service)",
            ));
        }
        if self.poll_interval_seconds == 0 {
            return Err(AppError::config("POLL_INTERVAL_SECONDS must be greater than zero"));
        }
        if self.alert_cooldown_seconds <= self.poll_interval_seconds {
            return Err(AppError::config(format!(
                "ALERT_COOLDOWN_SECONDS ({}) must be greater than POLL_INTERVAL_SECONDS ({})",
                self.alert_cooldown_seconds, self.poll_interval_seconds
            )));
        }
        if self.alert_cooldown_seconds > MAX_ALERT_COOLDOWN_SECONDS {
            return Err(AppError::config(format!(
                "ALERT_COOLDOWN_SECONDS ({}) must not exceed {}",
                self.alert_cooldown_seconds, MAX_ALERT_COOLDOWN_SECONDS
            )));
        }
        if self.sender.trim().is_empty() {
            return Err(AppError::config("TWILIO_FROM must not be empty"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn alert_cooldown(&self) -> Result<chrono::Duration, AppError> {
        i64::try_from(self.alert_cooldown_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| AppError::config("ALERT_COOLDOWN_SECONDS is out of range"))
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, AppError> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{} must be a valid number", key))),
        None => Ok(default),
    }
}
