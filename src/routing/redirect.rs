//! Redirect Evaluator.
//!
//! Turns a triggering status (404 when nothing resolves, a prevalidation
//! `command` otherwise) into a final outcome using the `redirects` table.

use std::collections::BTreeMap;

use crate::config::schema::RedirectRuleConfig;
use crate::routing::request::RequestDescriptor;
use crate::routing::router::ResolutionResult;
use crate::routing::url::UrlBuilder;

#[derive(Debug, Default)]
pub struct RedirectEvaluator {
    rules: BTreeMap<u16, RedirectRuleConfig>,
}

impl RedirectEvaluator {
    /// Expects a validated table; keys are status codes.
    pub fn new(table: &BTreeMap<String, RedirectRuleConfig>) -> Self {
        let rules = table
            .iter()
            .filter_map(|(key, rule)| Some((key.parse::<u16>().ok()?, rule.clone())))
            .collect();
        Self { rules }
    }

    /// Resolve a triggered status.
    ///
    /// `fallback` is the location used for a 3xx status with no rule of its own;
    /// without one (or for non-redirect statuses) the outcome is `NotFound`.
    pub fn evaluate(
        &self,
        status: u16,
        request: &RequestDescriptor,
        routed: &[String],
        urls: &UrlBuilder<'_>,
        fallback: Option<String>,
    ) -> ResolutionResult {
        if let Some(rule) = self.rules.get(&status) {
            if !rule.force_rewrite && Self::already_at(rule, request, routed, urls) {
                tracing::debug!(status, "Request already at redirect target");
                return ResolutionResult::NotFound;
            }
            let location = urls.build(
                &rule.segments,
                &rule.query,
                request.is_secure,
                &rule.host,
                false,
            );
            return ResolutionResult::Redirect {
                status_code: rule.status,
                location,
            };
        }

        match fallback {
            Some(location) if (300..400).contains(&status) => ResolutionResult::Redirect {
                status_code: status,
                location,
            },
            _ => ResolutionResult::NotFound,
        }
    }

    // `routed` excludes the ignored prefix, which `UrlBuilder::path` adds back to both sides.
    fn already_at(
        rule: &RedirectRuleConfig,
        request: &RequestDescriptor,
        routed: &[String],
        urls: &UrlBuilder<'_>,
    ) -> bool {
        urls.host_for(&rule.host) == request.host
            && urls.path(&rule.segments, false) == urls.path(routed, false)
            && rule.query == request.query_params
    }
}
