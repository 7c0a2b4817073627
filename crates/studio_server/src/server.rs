//! Listener lifecycle.

use axum::Router;
use studio_error::{ServerError, ServerErrorKind, StudioResult};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Bind `addr` and serve `router` until SIGINT or SIGTERM.
pub async fn serve(addr: &str, router: Router) -> StudioResult<()> {
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        ServerError::new(ServerErrorKind::Internal(format!("failed to bind {addr}: {e}")))
    })?;
    serve_on(listener, router).await
}

/// Serve on an already-bound listener.
pub async fn serve_on(listener: TcpListener, router: Router) -> StudioResult<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Studio API listening");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Internal(format!("server error: {e}"))))?;

    info!("Studio API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
