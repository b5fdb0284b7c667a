//! Controller registry.
//!
//! # Responsibilities
//! - Map fully qualified controller classes to handlers
//! - Answer the router's "does this controller exist" question
//!
//! # Design Decisions
//! - Read-only once built; a config reload builds a fresh registry through
//!   a [`RegistryBuilder`] and swaps it in together with the router
//! - Lookup by exact class name; no dynamic name resolution

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::config::RoutingConfig;
use crate::routing::{class_name, ControllerCatalog, DispatchTarget, RequestDescriptor};

/// What a controller gets to see.
#[derive(Debug)]
pub struct DispatchContext<'a> {
    pub target: &'a DispatchTarget,
    pub request: &'a RequestDescriptor,
    /// Common URLs rendered for this request.
    pub common_urls: &'a BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// A request handler selected by resolution.
pub trait Controller: Send + Sync {
    fn handle(&self, ctx: &DispatchContext<'_>) -> ControllerResponse;
}

/// Builds the registry that matches a configuration.
pub type RegistryBuilder = Arc<dyn Fn(&RoutingConfig) -> ControllerRegistry + Send + Sync>;

/// Static dispatch table keyed by controller class.
#[derive(Default, Clone)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut classes: Vec<_> = self.controllers.keys().collect();
        classes.sort();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &classes)
            .finish()
    }
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `controller` under `class`, replacing any previous entry.
    pub fn register(&mut self, class: impl Into<String>, controller: Arc<dyn Controller>) -> &mut Self {
        self.controllers.insert(class.into(), controller);
        self
    }

    pub fn get(&self, class: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.get(class)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Run the controller for `ctx.target`, if registered.
    pub fn dispatch(&self, ctx: &DispatchContext<'_>) -> Option<ControllerResponse> {
        let controller = self.get(&ctx.target.controller_class)?;
        Some(controller.handle(ctx))
    }

    /// Register [`EchoController`] for every class `config` can route to:
    /// the index of each namespace, page route targets, and legacy route
    /// controllers in each host namespace.
    pub fn with_echo(config: &RoutingConfig) -> Self {
        let echo: Arc<dyn Controller> = Arc::new(EchoController);
        let mut registry = Self::new();

        let host_namespaces: Vec<&String> = std::iter::once(&config.namespace)
            .chain(config.host_rules.iter().map(|rule| &rule.namespace))
            .collect();
        let namespaces = host_namespaces
            .iter()
            .copied()
            .chain(config.segments.values())
            .chain(config.host_rules.iter().flat_map(|rule| rule.segments.values()));

        for namespace in namespaces {
            registry.register(class_name(namespace, &config.index_controller), echo.clone());
        }
        for (namespace, pages) in &config.pages {
            for controller in pages.values() {
                registry.register(class_name(namespace, controller), echo.clone());
            }
        }
        for namespace in &host_namespaces {
            for route in &config.routes {
                registry.register(class_name(namespace, &route.controller), echo.clone());
            }
        }
        registry
    }
}

impl ControllerCatalog for ControllerRegistry {
    fn contains(&self, controller_class: &str) -> bool {
        self.controllers.contains_key(controller_class)
    }
}

/// Answers with the dispatch target and common URLs as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoController;

impl Controller for EchoController {
    fn handle(&self, ctx: &DispatchContext<'_>) -> ControllerResponse {
        ControllerResponse {
            status: 200,
            body: serde_json::json!({
                "target": ctx.target,
                "common_urls": ctx.common_urls,
            }),
        }
    }
}
