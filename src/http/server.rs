//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the resolver handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Resolve every request and answer with dispatch, redirect or 404
//! - Apply configuration updates without dropping in-flight requests

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigError, RoutingConfig};
use crate::dispatch::{ControllerRegistry, DispatchContext, RegistryBuilder};
use crate::http::request::{describe, request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{ControllerCatalog, ResolutionResult, Router as RouteResolver};

/// A compiled router and the controllers built for the same configuration.
#[derive(Debug)]
pub struct Routes {
    pub router: RouteResolver,
    pub registry: ControllerRegistry,
}

impl Routes {
    /// Compile `config` and build its registry.
    pub fn build(config: RoutingConfig, build_registry: &RegistryBuilder) -> Result<Self, ConfigError> {
        let registry = build_registry(&config);
        let router = RouteResolver::from_config(config)?;
        Ok(Self { router, registry })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<ArcSwap<Routes>>,
    pub build_registry: RegistryBuilder,
}

/// HTTP front for the route resolver.
pub struct HttpServer {
    app: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server around a compiled router.
    ///
    /// `build_registry` supplies the controllers for the startup configuration
    /// and again for every reloaded one.
    pub fn new<F>(router: RouteResolver, build_registry: F) -> Self
    where
        F: Fn(&RoutingConfig) -> ControllerRegistry + Send + Sync + 'static,
    {
        let build_registry: RegistryBuilder = Arc::new(build_registry);
        let request_timeout = Duration::from_secs(router.config().server.request_timeout_secs);
        let registry = build_registry(router.config());
        tracing::info!(controllers = registry.len(), "Controllers registered");

        let state = AppState {
            routes: Arc::new(ArcSwap::from_pointee(Routes { router, registry })),
            build_registry,
        };

        let app = Self::build_router(request_timeout, state.clone());
        Self { app, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(request_timeout: Duration, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(resolve_handler))
            .route("/", any(resolve_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// Shared state (current routes and the registry builder).
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the server until `shutdown` fires, applying every config pushed on `config_updates`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RoutingConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                apply_config(&state, config);
            }
        });

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Compile `config`, rebuild its controllers and swap both in at once.
/// A config that fails to compile is dropped.
pub fn apply_config(state: &AppState, config: RoutingConfig) -> bool {
    match Routes::build(config, &state.build_registry) {
        Ok(routes) => {
            tracing::debug!(controllers = routes.registry.len(), "Controllers rebuilt");
            state.routes.store(Arc::new(routes));
            metrics::record_reload(true);
            tracing::info!("Routing configuration reloaded");
            true
        }
        Err(e) => {
            metrics::record_reload(false);
            tracing::error!(error = %e, "Rejected routing configuration, keeping current one");
            false
        }
    }
}

/// Resolve the request and answer with the outcome.
async fn resolve_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);
    let descriptor = describe(&request);

    let routes = state.routes.load();
    let router = &routes.router;
    let catalog: &dyn ControllerCatalog = &routes.registry;
    let result = router.resolve_with(&descriptor, Some(catalog));
    metrics::record_resolution(result.outcome(), start);

    tracing::debug!(
        request_id = %request_id,
        host = %descriptor.host,
        path = %request.uri().path(),
        outcome = result.outcome(),
        "Request resolved"
    );

    match result {
        ResolutionResult::Dispatch(target) => {
            let common_urls = router.common_urls(&descriptor);
            let ctx = DispatchContext {
                target: &target,
                request: &descriptor,
                common_urls: &common_urls,
            };
            match routes.registry.dispatch(&ctx) {
                Some(controller_response) => response::controller(controller_response),
                None => {
                    tracing::warn!(request_id = %request_id, class = %target.controller_class, "Controller vanished after resolution");
                    response::not_found()
                }
            }
        }
        ResolutionResult::Redirect {
            status_code,
            location,
        } => response::redirect(status_code, &location),
        ResolutionResult::NotFound => response::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(config: RoutingConfig) -> AppState {
        HttpServer::new(RouteResolver::from_config(config).unwrap(), ControllerRegistry::with_echo).state()
    }

    #[test]
    fn rejected_config_keeps_current_routes() {
        let state = state(RoutingConfig::default());

        let mut bad = RoutingConfig::default();
        bad.routes.push(crate::config::LegacyRouteConfig {
            pattern: "(".into(),
            segment: 0,
            controller: "index".into(),
        });
        assert!(!apply_config(&state, bad));
        assert_eq!(state.routes.load().router.config().namespace, "app::web");

        let good = RoutingConfig {
            namespace: "app::next".into(),
            ..RoutingConfig::default()
        };
        assert!(apply_config(&state, good));
        assert_eq!(state.routes.load().router.config().namespace, "app::next");
    }

    #[test]
    fn reload_rebuilds_registry() {
        let state = state(RoutingConfig::default());
        assert!(!state.routes.load().registry.contains("app::shop::Index"));

        let mut config = RoutingConfig::default();
        config.segments.insert("shop".into(), "app::shop".into());
        assert!(apply_config(&state, config));
        assert!(state.routes.load().registry.contains("app::shop::Index"));
    }
}
