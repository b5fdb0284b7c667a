//! URI Router server.
//!
//! Resolves every incoming request against the routing configuration and
//! answers with the dispatched controller, a redirect, or 404.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server ───▶ routing::Router ───▶ Dispatch ──▶ dispatch::ControllerRegistry
//!                      (request id,       (host rules,          Redirect ──▶ Location header
//!                       timeout, trace)    legacy routes,        NotFound ──▶ 404
//!                                          prevalidation)
//!
//!     config file ──▶ config::watcher ──┐
//!     SIGHUP ───────▶ lifecycle::signals ┴──▶ compile ──▶ ArcSwap<Routes>
//! ```
//!
//! Usage: `uri-router [CONFIG]` (defaults to `routing.toml`; missing file means defaults).

use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use uri_router::config::{load_config, watcher::ConfigWatcher, RoutingConfig};
use uri_router::dispatch::ControllerRegistry;
use uri_router::http::HttpServer;
use uri_router::lifecycle::{signals, Shutdown};
use uri_router::observability::{logging, metrics};
use uri_router::routing::Router;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("routing.toml"));

    let config = if config_path.exists() {
        load_config(&config_path)?
    } else {
        RoutingConfig::default()
    };

    logging::init_logging(&config.observability);
    tracing::info!("uri-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        path = %config_path.display(),
        host_rules = config.host_rules.len(),
        routes = config.routes.len(),
        bind_address = %config.server.bind_address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let router = Router::from_config(config)?;

    let shutdown = Shutdown::new();
    signals::spawn_shutdown_listener(&shutdown);

    // Keep the watcher alive for the lifetime of the server.
    let (updates_tx, updates_rx, _watcher) = if config_path.exists() {
        let (watcher, rx) = ConfigWatcher::new(&config_path);
        let tx = watcher.sender();
        (tx, rx, Some(watcher.run()?))
    } else {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, rx, None)
    };
    signals::spawn_reload_on_hangup(config_path.clone(), updates_tx, shutdown.subscribe());

    let server = HttpServer::new(router, ControllerRegistry::with_echo);
    server.run(listener, updates_rx, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
