//! Configuration schema definitions.
//!
//! This module defines the complete routing configuration.
//! All types derive Serde traits for deserialization from config files.
//! Ordered tables (`host_rules`, `routes`) are TOML arrays of tables so
//! first-match order is the declaration order in the file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Default module for controllers.
    pub module: String,

    /// Default namespace for controllers.
    pub namespace: String,

    /// Default namespaces by first URI segment.
    pub segments: BTreeMap<String, String>,

    /// Overrides by HTTP host. Patterns are regular expressions, checked in order.
    pub host_rules: Vec<HostRuleConfig>,

    /// Old style regex routing, checked in order.
    pub routes: Vec<LegacyRouteConfig>,

    /// Page routing: namespace -> (slug -> controller name).
    pub pages: BTreeMap<String, BTreeMap<String, String>>,

    /// Redirections keyed by triggering status code ("404", "301").
    pub redirects: BTreeMap<String, RedirectRuleConfig>,

    /// Segment checks applied to a controller before dispatch.
    pub prevalidate: BTreeMap<String, PrevalidateConfig>,

    /// Number of leading path segments skipped before routing.
    pub ignored_segments: usize,

    /// Redirect URIs ending with a slash to the slashless form.
    pub redirect_last_slash: bool,

    /// Redirect namespace index URIs to the slashed form.
    pub force_slash_on_index: bool,

    /// Path prefix of every built URL.
    pub system_root: String,

    /// Controller used when no segment is left to name one.
    pub index_controller: String,

    /// Host variants for URL building.
    pub url: UrlConfig,

    /// Named URLs injected into templates.
    pub common_urls: BTreeMap<String, CommonUrlConfig>,

    /// HTTP front settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            module: String::new(),
            namespace: "app::web".to_string(),
            segments: BTreeMap::new(),
            host_rules: Vec::new(),
            routes: Vec::new(),
            pages: BTreeMap::new(),
            redirects: BTreeMap::new(),
            prevalidate: BTreeMap::new(),
            ignored_segments: 0,
            redirect_last_slash: true,
            force_slash_on_index: true,
            system_root: "/".to_string(),
            index_controller: "index".to_string(),
            url: UrlConfig::default(),
            common_urls: BTreeMap::new(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Routing override for requests whose host matches `pattern`.
///
/// `module`, `namespace` and `template` replace the defaults outright;
/// `segments` is merged over the default segment map key by key.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HostRuleConfig {
    /// Regex searched (not anchored) in the request host.
    pub pattern: String,

    #[serde(default)]
    pub module: String,

    pub namespace: String,

    #[serde(default)]
    pub segments: BTreeMap<String, String>,

    /// Template flags handed to the dispatcher untouched.
    #[serde(default)]
    pub template: Vec<String>,
}

/// Backward-compatible short URL.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LegacyRouteConfig {
    /// Regex matched against the whole remaining path.
    pub pattern: String,

    /// Index of the segment replaced by `controller`.
    #[serde(default)]
    pub segment: usize,

    pub controller: String,
}

/// Redirect built when its status key is triggered.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RedirectRuleConfig {
    /// Target path segments.
    pub segments: Vec<String>,

    /// Target query parameters.
    pub query: BTreeMap<String, String>,

    /// Redirect even when the request is already at the target.
    pub force_rewrite: bool,

    /// `"dynamic"` for the request host, a `url.hosts` key, or a literal host.
    pub host: String,

    /// Status code of the emitted redirect.
    pub status: u16,
}

impl Default for RedirectRuleConfig {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            query: BTreeMap::new(),
            force_rewrite: false,
            host: DYNAMIC_HOST.to_string(),
            status: 301,
        }
    }
}

/// Host keyword meaning "whatever host the request came in on".
pub const DYNAMIC_HOST: &str = "dynamic";

/// Checks applied to a controller's remaining segments.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PrevalidateConfig {
    /// Status triggered when validation fails (typically 301 or 404).
    pub command: u16,

    /// Maximum number of segments after the controller.
    pub segments: usize,

    /// One regex per segment, in order. Missing entries accept anything.
    #[serde(default)]
    pub validate: Vec<String>,
}

/// Host variants used by URL building.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct UrlConfig {
    /// Variant name -> host (e.g. `static = "cdn.example.com"`).
    pub hosts: BTreeMap<String, String>,

    /// Variants always built with `https`.
    pub https_variants: Vec<String>,
}

/// A named `build_url` invocation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CommonUrlConfig {
    pub segments: Vec<String>,
    pub query: BTreeMap<String, String>,
    pub secure: bool,
    pub variant: String,
    pub trailing: bool,
}

impl Default for CommonUrlConfig {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            query: BTreeMap::new(),
            secure: false,
            variant: DYNAMIC_HOST.to_string(),
            trailing: true,
        }
    }
}

/// HTTP front configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
