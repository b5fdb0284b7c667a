//! OS signal handling.
//!
//! # Responsibilities
//! - SIGTERM/SIGINT → trigger graceful shutdown
//! - SIGHUP → reload configuration from disk
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown

use std::path::PathBuf;

use tokio::sync::{broadcast, mpsc};

use crate::config::watcher::reload_into;
use crate::config::RoutingConfig;
use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}

/// Trigger `shutdown` once a termination signal arrives.
pub fn spawn_shutdown_listener(shutdown: &Shutdown) {
    let tx = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tx.trigger();
    });
}

/// Reload `path` into `updates` on every SIGHUP until shutdown.
#[cfg(unix)]
pub fn spawn_reload_on_hangup(
    path: PathBuf,
    updates: mpsc::UnboundedSender<RoutingConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    tokio::spawn(async move {
        let mut hangup = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup()) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGHUP");
                return;
            }
        };
        loop {
            tokio::select! {
                _ = hangup.recv() => {
                    tracing::info!(path = ?path, "SIGHUP received, reloading configuration");
                    reload_into(&path, &updates);
                }
                _ = shutdown.recv() => break,
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_reload_on_hangup(
    _path: PathBuf,
    _updates: mpsc::UnboundedSender<RoutingConfig>,
    _shutdown: broadcast::Receiver<()>,
) {
}
