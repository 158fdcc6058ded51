use clap::Parser;

/// Service watchdog CLI arguments
///
/// Every flag overrides the matching environment variable. The auth token
/// is only read from `TWILIO_AUTH_TOKEN` or the terminal prompt.
#[derive(Debug, Parser)]
#[command(
    name = "service-watchdog",
    version,
    about = "Watches OS services and messages an operator when one stops"
)]
pub struct Cli {
    /// Service to watch (repeat for several; order is kept)
    #[arg(long = "service", value_name = "NAME")]
    pub services: Vec<String>,

    /// Alert recipient in international format, e.g. +5511999999999
    #[arg(long)]
    pub recipient: Option<String>,

    /// Twilio account SID
    #[arg(long)]
    pub account_sid: Option<String>,

    /// Sender address, e.g. whatsapp:+14155238886
    #[arg(long)]
    pub from: Option<String>,

    /// Port for the inbound webhook
    #[arg(long)]
    pub port: Option<u16>,

    /// Service polling interval in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Minimum seconds between two alerts for the same service
    #[arg(long)]
    pub cooldown: Option<u64>,

    /// Fail instead of prompting for missing or invalid credentials
    #[arg(long)]
    pub no_prompt: bool,
}
