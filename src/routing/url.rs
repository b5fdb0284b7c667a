//! URL building shared with templates, assets and redirects.

use std::collections::BTreeMap;

use crate::config::schema::{RoutingConfig, UrlConfig, DYNAMIC_HOST};

/// Builds absolute URLs for one request.
///
/// `prefix` holds the ignored leading segments of the current request so
/// that every link stays under them.
#[derive(Debug, Clone)]
pub struct UrlBuilder<'a> {
    current_host: &'a str,
    prefix: &'a [String],
    system_root: &'a str,
    url: &'a UrlConfig,
}

impl<'a> UrlBuilder<'a> {
    pub fn new(config: &'a RoutingConfig, current_host: &'a str, prefix: &'a [String]) -> Self {
        Self {
            current_host,
            prefix,
            system_root: config.system_root.trim_end_matches('/'),
            url: &config.url,
        }
    }

    /// Host for a variant: the request host, a configured variant, or the literal name.
    pub fn host_for<'s>(&'s self, variant: &'s str) -> &'s str {
        if variant == DYNAMIC_HOST {
            return self.current_host;
        }
        self.url
            .hosts
            .get(variant)
            .map_or(variant, String::as_str)
    }

    /// Build `scheme://host/root/prefix/segments[/][?query]`.
    pub fn build(
        &self,
        segments: &[String],
        query: &BTreeMap<String, String>,
        secure: bool,
        variant: &str,
        append_trailing: bool,
    ) -> String {
        let https = secure || self.url.https_variants.iter().any(|v| v == variant);
        let mut out = format!(
            "{}://{}{}",
            if https { "https" } else { "http" },
            self.host_for(variant),
            self.system_root
        );

        out.push_str(&self.path(segments, append_trailing));

        if !query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter())
                .finish();
            out.push('?');
            out.push_str(&encoded);
        }
        out
    }

    /// Path part only (`/prefix/segments[/]`), without root, host or query.
    pub fn path(&self, segments: &[String], append_trailing: bool) -> String {
        let mut out = String::new();
        for segment in self.prefix.iter().chain(segments) {
            out.push('/');
            out.push_str(&urlencoding::encode(segment));
        }
        if append_trailing {
            out.push('/');
        }
        out
    }
}
