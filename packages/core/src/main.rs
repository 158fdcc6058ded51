use std::future::IntoFuture;
use std::io;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::RwLock;

use service_watchdog::alerts::AlertDebouncer;
use service_watchdog::api::{create_router, AppState};
use service_watchdog::cli::Cli;
use service_watchdog::config::Config;
use service_watchdog::credentials::{resolve_credentials, Credentials};
use service_watchdog::error::AppError;
use service_watchdog::logging::init_logging;
use service_watchdog::metrics::AppMetrics;
use service_watchdog::scheduler::{run_service_polling, ServicePoller};
use service_watchdog::server::{bind_listener, serve_until_stopped};
use service_watchdog::services::{CommandProber, Notifier, ServiceProber, TwilioClient};

fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::from_env()?;
    config.apply_cli(&cli);
    config.validate()?;

    // Credentials are gathered before the runtime starts so the prompt
    // can block on the terminal.
    let credentials = if cli.no_prompt {
        Credentials::from_raw(&config.credentials)?
    } else {
        let stdin = io::stdin();
        resolve_credentials(&config.credentials, &mut stdin.lock(), &mut io::stdout())?
    };

    tracing::info!(
        "Watchdog configured: services={:?}, recipient={}, interval={}s, cooldown={}s",
        config.services.iter().map(|s| s.name()).collect::<Vec<_>>(),
        credentials.recipient,
        config.poll_interval_seconds,
        config.alert_cooldown_seconds,
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config, credentials))
}

async fn serve(config: Config, credentials: Credentials) -> Result<(), AppError> {
    let services = Arc::new(config.services.clone());
    let metrics = Arc::new(AppMetrics::new()?);
    let alert_record = Arc::new(RwLock::new(AlertDebouncer::new(config.alert_cooldown()?)));

    let prober: Arc<dyn ServiceProber + Send + Sync> = Arc::new(CommandProber::default());
    let notifier: Arc<dyn Notifier + Send + Sync> = Arc::new(TwilioClient::new(
        config.twilio_api_url.clone(),
        credentials.account_sid,
        credentials.auth_token,
        config.sender.clone(),
    ));

    let poller = ServicePoller {
        services: services.clone(),
        prober: prober.clone(),
        notifier: notifier.clone(),
        recipient: credentials.recipient,
        alert_record: alert_record.clone(),
        metrics: Some(metrics.clone()),
    };
    let polling = tokio::spawn(run_service_polling(poller, config.poll_interval()));

    let app = create_router(AppState {
        services,
        prober,
        notifier,
        alert_record,
        metrics,
    });

    let port = config.listen_port;
    let listener = bind_listener(port).await?;

    tracing::info!("HTTP server listening on port {}...", port);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    serve_until_stopped(server, polling).await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
