//! Route matching logic.
//!
//! # Responsibilities
//! - Match host header against ordered regex host rules (search, not full match)
//! - Map the first path segment to a namespace
//! - Match the remaining path against ordered legacy regex routes
//!
//! # Design Decisions
//! - Patterns are compiled once in `from_config`, never per request
//! - Host and segment matching is case-sensitive on already-lowercased hosts
//! - First declared match wins everywhere; no priorities
//! - Legacy routes are anchored at both ends

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::loader::ConfigError;
use crate::config::schema::{HostRuleConfig, LegacyRouteConfig, RoutingConfig};

/// Routing context in effect for one request: defaults, or a host rule's overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    pub module: String,
    pub namespace: String,
    pub segments: BTreeMap<String, String>,
    pub template: Vec<String>,
}

#[derive(Debug)]
struct HostRule {
    pattern: Regex,
    context: HostContext,
}

/// Matches the Host header against ordered host rules.
#[derive(Debug)]
pub struct HostMatcher {
    default: HostContext,
    rules: Vec<HostRule>,
}

impl HostMatcher {
    /// Compile the host rules of `config`.
    pub fn from_config(config: &RoutingConfig) -> Result<Self, ConfigError> {
        let default = HostContext {
            module: config.module.clone(),
            namespace: config.namespace.clone(),
            segments: config.segments.clone(),
            template: Vec::new(),
        };

        let rules = config
            .host_rules
            .iter()
            .map(|rule| -> Result<HostRule, ConfigError> {
                Ok(HostRule {
                    pattern: compile("host_rules", &rule.pattern)?,
                    context: Self::overlay(&default, rule),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { default, rules })
    }

    // module/namespace/template replace; segments merge per key.
    fn overlay(default: &HostContext, rule: &HostRuleConfig) -> HostContext {
        let mut segments = default.segments.clone();
        segments.extend(rule.segments.iter().map(|(k, v)| (k.clone(), v.clone())));
        HostContext {
            module: rule.module.clone(),
            namespace: rule.namespace.clone(),
            segments,
            template: rule.template.clone(),
        }
    }

    /// Context of the first rule whose pattern is found in `host`, or the defaults.
    pub fn context_for(&self, host: &str) -> &HostContext {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(host))
            .map_or(&self.default, |rule| &rule.context)
    }
}

/// Maps a leading path segment to a namespace override.
#[derive(Debug, Clone, Copy)]
pub struct SegmentMapper<'a> {
    segments: &'a BTreeMap<String, String>,
}

impl<'a> SegmentMapper<'a> {
    pub fn new(context: &'a HostContext) -> Self {
        Self {
            segments: &context.segments,
        }
    }

    /// Namespace for `segment`, on exact case-sensitive match.
    pub fn namespace_for(&self, segment: &str) -> Option<&'a str> {
        self.segments.get(segment).map(String::as_str)
    }
}

#[derive(Debug)]
struct LegacyRoute {
    pattern: Regex,
    segment: usize,
    controller: String,
}

/// Controller chosen by a legacy route, with the segments it hands over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyMatch {
    pub controller: String,
    /// Capture group `segment` split on `/`; empty when `segment` is 0.
    pub segments: Vec<String>,
}

/// Matches the remaining path against old style regex routes.
#[derive(Debug)]
pub struct LegacyRouteMatcher {
    routes: Vec<LegacyRoute>,
}

impl LegacyRouteMatcher {
    pub fn from_config(routes: &[LegacyRouteConfig]) -> Result<Self, ConfigError> {
        let routes = routes
            .iter()
            .map(|route| -> Result<LegacyRoute, ConfigError> {
                Ok(LegacyRoute {
                    pattern: compile("routes", &anchored(&route.pattern))?,
                    segment: route.segment,
                    controller: route.controller.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routes })
    }

    /// First route matching `segments` (joined by `/`).
    ///
    /// A capture group that did not take part in the match hands over no segments.
    pub fn find(&self, segments: &[String], trailing_slash: bool) -> Option<LegacyMatch> {
        let mut path = segments.join("/");
        if trailing_slash {
            path.push('/');
        }

        let (route, captures) = self
            .routes
            .iter()
            .find_map(|r| r.pattern.captures(&path).map(|c| (r, c)))?;
        tracing::debug!(path = %path, route = route.pattern.as_str(), "Legacy route matched");

        let segments = match route.segment {
            0 => Vec::new(),
            group => captures
                .get(group)
                .map(|m| {
                    m.as_str()
                        .split('/')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };
        Some(LegacyMatch {
            controller: route.controller.clone(),
            segments,
        })
    }
}

/// `^(?:pattern)$`; the wrapper group does not shift capture numbering.
pub fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

fn compile(table: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Malformed {
        table,
        pattern: pattern.to_string(),
        source,
    })
}

/// Compile a per-segment validator.
///
/// Accepts bare patterns and PCRE-style `/pattern/flags`; the `i`, `m`, `s`
/// and `x` flags are carried over as inline flags, others are ignored.
pub fn compile_validator(pattern: &str) -> Result<Regex, regex::Error> {
    let Some(body) = pattern.strip_prefix('/') else {
        return Regex::new(pattern);
    };
    let Some((inner, flags)) = body.rsplit_once('/') else {
        return Regex::new(pattern);
    };

    let inline: String = flags.chars().filter(|c| "imsx".contains(*c)).collect();
    if inline.is_empty() {
        Regex::new(inner)
    } else {
        Regex::new(&format!("(?{inline}){inner}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_rule(pattern: &str, namespace: &str) -> HostRuleConfig {
        HostRuleConfig {
            pattern: pattern.into(),
            module: "m".into(),
            namespace: namespace.into(),
            segments: BTreeMap::new(),
            template: vec!["$admin".into()],
        }
    }

    #[test]
    fn unmatched_host_uses_defaults() {
        let mut config = RoutingConfig::default();
        config.host_rules.push(host_rule(r"admin\.example\.com", "app::admin"));
        let matcher = HostMatcher::from_config(&config).unwrap();

        let ctx = matcher.context_for("www.example.com");
        assert_eq!(ctx.namespace, "app::web");
        assert_eq!(ctx.module, "");
        assert!(ctx.template.is_empty());
    }

    #[test]
    fn host_pattern_is_searched_not_anchored() {
        let mut config = RoutingConfig::default();
        config.host_rules.push(host_rule(r"localhost", "app::local"));
        let matcher = HostMatcher::from_config(&config).unwrap();

        assert_eq!(matcher.context_for("dev.localhost.localdomain").namespace, "app::local");
    }

    #[test]
    fn first_declared_host_rule_wins() {
        let mut config = RoutingConfig::default();
        config.host_rules.push(host_rule(r"example", "app::first"));
        config.host_rules.push(host_rule(r"example\.com", "app::second"));
        let matcher = HostMatcher::from_config(&config).unwrap();

        assert_eq!(matcher.context_for("example.com").namespace, "app::first");
    }

    #[test]
    fn host_segments_override_per_key() {
        let mut config = RoutingConfig::default();
        config.segments.insert("api".into(), "app::api".into());
        config.segments.insert("blog".into(), "app::blog".into());
        let mut rule = host_rule("local", "app::local");
        rule.segments.insert("api".into(), "app::local::api".into());
        config.host_rules.push(rule);
        let matcher = HostMatcher::from_config(&config).unwrap();

        let mapper = SegmentMapper::new(matcher.context_for("local"));
        assert_eq!(mapper.namespace_for("api"), Some("app::local::api"));
        assert_eq!(mapper.namespace_for("blog"), Some("app::blog"));
        assert_eq!(mapper.namespace_for("API"), None);
    }

    fn legacy(pattern: &str, segment: usize, controller: &str) -> LegacyRouteMatcher {
        LegacyRouteMatcher::from_config(&[LegacyRouteConfig {
            pattern: pattern.into(),
            segment,
            controller: controller.into(),
        }])
        .unwrap()
    }

    fn segs(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn legacy_route_resolves_to_controller() {
        let matcher = legacy(r"home(\/)*(\?(.*))*", 0, "index");

        let hit = matcher.find(&segs(&["home"]), true).unwrap();
        assert_eq!(hit.controller, "index");
        assert!(hit.segments.is_empty());

        assert_eq!(matcher.find(&segs(&["homepage"]), false), None);
    }

    #[test]
    fn legacy_route_hands_over_capture_group() {
        let matcher = legacy(r"p/([0-9]+)", 1, "post");

        let hit = matcher.find(&segs(&["p", "42"]), false).unwrap();
        assert_eq!(hit.controller, "post");
        assert_eq!(hit.segments, vec!["42"]);

        let matcher = legacy(r"archive/(([0-9]{4})/([0-9]{2}))/?", 1, "archive");
        let hit = matcher.find(&segs(&["archive", "2019", "07"]), true).unwrap();
        assert_eq!(hit.segments, vec!["2019", "07"]);
    }

    #[test]
    fn unmatched_optional_group_hands_over_nothing() {
        let matcher = legacy(r"feed(/([a-z]+))?", 2, "feed");
        let hit = matcher.find(&segs(&["feed"]), false).unwrap();
        assert_eq!(hit.controller, "feed");
        assert!(hit.segments.is_empty());
    }

    #[test]
    fn bad_pattern_is_malformed() {
        let err = LegacyRouteMatcher::from_config(&[LegacyRouteConfig {
            pattern: "(".into(),
            segment: 0,
            controller: "x".into(),
        }])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { table: "routes", .. }));
    }

    #[test]
    fn validator_delimiters_are_stripped() {
        let re = compile_validator("/^[a-z0-9\\-]+$/").unwrap();
        assert!(re.is_match("ab-12"));
        assert!(!re.is_match("AB"));

        let re = compile_validator("/^[a-z]+$/i").unwrap();
        assert!(re.is_match("AB"));

        let re = compile_validator("^[0-9]+$").unwrap();
        assert!(re.is_match("999"));
    }
}
