//! Process-level plumbing around the HTTP listener and the poll task.

use std::future::Future;
use std::io;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::error::AppError;

/// Bind the HTTP listener on all interfaces.
pub async fn bind_listener(port: u16) -> Result<TcpListener, AppError> {
    TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| AppError::Bind { port, source })
}

/// Drive the HTTP server while watching the poll task.
///
/// The poll task only returns on its own after a shutdown signal, in which
/// case the server is left to drain. If it panics or is cancelled the
/// watchdog is no longer alerting, so this returns an error instead of
/// serving on without it.
pub async fn serve_until_stopped<S>(server: S, mut polling: JoinHandle<()>) -> Result<(), AppError>
where
    S: Future<Output = io::Result<()>>,
{
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            polling.abort();
            result?;
        }
        joined = &mut polling => match joined {
            Ok(()) => server.await?,
            Err(err) => {
                tracing::error!("Service polling task ended: {}", err);
                return Err(AppError::PollerStopped(err.to_string()));
            }
        },
    }

    Ok(())
}
