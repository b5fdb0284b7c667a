//! Route resolution.
//!
//! # Responsibilities
//! - Hold the compiled routing tables
//! - Resolve a request into a dispatch target, a redirect, or not-found
//! - Build URLs relative to a request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - `resolve` is a pure function of the config and the request
//! - Every per-request outcome is a value; only compilation can fail
//!
//! # Resolution Order
//! ```text
//! host rules → ignored segments → slash normalization
//!     → legacy route match, or segment namespace → page routes → controller
//!     → prevalidation → catalog check → redirect table
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::loader::ConfigError;
use crate::config::schema::{RoutingConfig, DYNAMIC_HOST};
use crate::config::validation::validate_config;
use crate::routing::matcher::{HostContext, HostMatcher, LegacyRouteMatcher, SegmentMapper};
use crate::routing::prevalidate::Prevalidator;
use crate::routing::redirect::RedirectEvaluator;
use crate::routing::request::RequestDescriptor;
use crate::routing::url::UrlBuilder;

/// Where a request goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionResult {
    Dispatch(DispatchTarget),
    Redirect { status_code: u16, location: String },
    NotFound,
}

impl ResolutionResult {
    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Dispatch(_) => "dispatch",
            Self::Redirect { .. } => "redirect",
            Self::NotFound => "not_found",
        }
    }
}

/// A resolved controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchTarget {
    pub module: String,
    pub namespace: String,
    /// Controller name as routed (`my-page`).
    pub controller: String,
    /// Fully qualified class (`app::web::MyPage`).
    pub controller_class: String,
    pub remaining_segments: Vec<String>,
    /// Template flags of the matched host rule.
    pub template: Vec<String>,
}

// Controller picked for a request before any check runs.
struct Resolved<'c> {
    namespace: &'c str,
    controller: String,
    /// Path segments that address the controller (kept in fallback URLs).
    consumed: Vec<String>,
    remaining: Vec<String>,
}

/// Lookup seam onto whatever instantiates controllers.
pub trait ControllerCatalog: Send + Sync {
    fn contains(&self, controller_class: &str) -> bool;
}

/// Compiled routing tables.
#[derive(Debug)]
pub struct Router {
    config: RoutingConfig,
    hosts: HostMatcher,
    legacy: LegacyRouteMatcher,
    prevalidator: Prevalidator,
    redirects: RedirectEvaluator,
}

impl Router {
    /// Validate and compile a configuration.
    pub fn from_config(config: RoutingConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let hosts = HostMatcher::from_config(&config)?;
        let legacy = LegacyRouteMatcher::from_config(&config.routes)?;
        let prevalidator = Prevalidator::from_config(&config.prevalidate)?;
        let redirects = RedirectEvaluator::new(&config.redirects);

        tracing::debug!(
            host_rules = config.host_rules.len(),
            routes = config.routes.len(),
            prevalidate = config.prevalidate.len(),
            "Routing tables compiled"
        );

        Ok(Self {
            config,
            hosts,
            legacy,
            prevalidator,
            redirects,
        })
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Resolve without a controller catalog: every controller is assumed to exist.
    pub fn resolve(&self, request: &RequestDescriptor) -> ResolutionResult {
        self.resolve_with(request, None)
    }

    /// Resolve a request. With a catalog, unknown controller classes trigger 404.
    pub fn resolve_with(
        &self,
        request: &RequestDescriptor,
        catalog: Option<&dyn ControllerCatalog>,
    ) -> ResolutionResult {
        let context = self.hosts.context_for(&request.host);
        let (prefix, routed) = self.split_ignored(request);
        let urls = UrlBuilder::new(&self.config, &request.host, prefix);
        let mapper = SegmentMapper::new(context);

        if let Some(redirect) = self.normalize_slash(request, routed, mapper, &urls) {
            return redirect;
        }

        let Resolved {
            namespace,
            controller,
            consumed,
            remaining,
        } = match self.legacy.find(routed, request.trailing_slash) {
            Some(hit) => Resolved {
                namespace: context.namespace.as_str(),
                consumed: vec![hit.controller.clone()],
                controller: hit.controller,
                remaining: hit.segments,
            },
            None => self.resolve_segments(context, mapper, routed),
        };

        if let Err(rejection) = self.prevalidator.check(&controller, &remaining) {
            tracing::debug!(
                controller = %controller,
                status = rejection.status,
                valid = rejection.valid_prefix,
                "Prevalidation failed"
            );
            let kept: Vec<String> = consumed
                .iter()
                .chain(&remaining[..rejection.valid_prefix])
                .cloned()
                .collect();
            let fallback = urls.build(&kept, &BTreeMap::new(), request.is_secure, DYNAMIC_HOST, false);
            return self
                .redirects
                .evaluate(rejection.status, request, routed, &urls, Some(fallback));
        }

        let controller_class = class_name(namespace, &controller);
        if let Some(catalog) = catalog {
            if !catalog.contains(&controller_class) {
                tracing::debug!(class = %controller_class, "Controller not registered");
                return self.redirects.evaluate(404, request, routed, &urls, None);
            }
        }

        ResolutionResult::Dispatch(DispatchTarget {
            module: context.module.clone(),
            namespace: namespace.to_string(),
            controller,
            controller_class,
            remaining_segments: remaining,
            template: context.template.clone(),
        })
    }

    /// Build a URL relative to `request` (host variant, ignored prefix).
    pub fn build_url(
        &self,
        request: &RequestDescriptor,
        segments: &[String],
        query: &BTreeMap<String, String>,
        secure: bool,
        variant: &str,
        append_trailing: bool,
    ) -> String {
        self.url_builder(request)
            .build(segments, query, secure, variant, append_trailing)
    }

    /// Every configured common URL, rendered for `request`.
    pub fn common_urls(&self, request: &RequestDescriptor) -> BTreeMap<String, String> {
        let urls = self.url_builder(request);
        self.config
            .common_urls
            .iter()
            .map(|(name, c)| {
                (
                    name.clone(),
                    urls.build(&c.segments, &c.query, c.secure, &c.variant, c.trailing),
                )
            })
            .collect()
    }

    /// Routing context a host resolves to.
    pub fn host_context(&self, host: &str) -> &HostContext {
        self.hosts.context_for(host)
    }

    fn url_builder<'a>(&'a self, request: &'a RequestDescriptor) -> UrlBuilder<'a> {
        let (prefix, _) = self.split_ignored(request);
        UrlBuilder::new(&self.config, &request.host, prefix)
    }

    // Segment map, then page routes, then the literal controller segment.
    fn resolve_segments<'c>(
        &'c self,
        context: &'c HostContext,
        mapper: SegmentMapper<'c>,
        routed: &[String],
    ) -> Resolved<'c> {
        let mut pos = 0;
        let namespace = match routed.first().and_then(|s| mapper.namespace_for(s)) {
            Some(ns) => {
                pos += 1;
                ns
            }
            None => context.namespace.as_str(),
        };

        let controller = match routed.get(pos) {
            Some(segment) => {
                pos += 1;
                self.config
                    .pages
                    .get(namespace)
                    .and_then(|pages| pages.get(segment))
                    .unwrap_or(segment)
                    .clone()
            }
            None => self.config.index_controller.clone(),
        };

        Resolved {
            namespace,
            controller,
            consumed: routed[..pos].to_vec(),
            remaining: routed[pos..].to_vec(),
        }
    }

    fn split_ignored<'a>(&self, request: &'a RequestDescriptor) -> (&'a [String], &'a [String]) {
        let at = self.config.ignored_segments.min(request.path_segments.len());
        request.path_segments.split_at(at)
    }

    // A namespace index is a lone segment the segment map knows (`/api/`).
    fn normalize_slash(
        &self,
        request: &RequestDescriptor,
        routed: &[String],
        mapper: SegmentMapper<'_>,
        urls: &UrlBuilder<'_>,
    ) -> Option<ResolutionResult> {
        if routed.is_empty() {
            return None;
        }
        let is_index = routed.len() == 1 && mapper.namespace_for(&routed[0]).is_some();

        let want_slash = if self.config.force_slash_on_index && is_index {
            true
        } else if self.config.redirect_last_slash {
            false
        } else {
            return None;
        };

        if want_slash == request.trailing_slash {
            return None;
        }
        Some(ResolutionResult::Redirect {
            status_code: 301,
            location: urls.build(
                routed,
                &request.query_params,
                request.is_secure,
                DYNAMIC_HOST,
                want_slash,
            ),
        })
    }
}

/// `app::web` + `my-page` → `app::web::MyPage`.
pub fn class_name(namespace: &str, controller: &str) -> String {
    let class: String = controller
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();

    let namespace = namespace.trim_end_matches(':');
    if namespace.is_empty() {
        class
    } else {
        format!("{namespace}::{class}")
    }
}
