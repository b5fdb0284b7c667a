//! Per-request input to resolution.

use std::collections::BTreeMap;

use serde::Serialize;

/// Everything the resolver looks at for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    /// Host header as sent (port included), lowercased.
    pub host: String,
    /// Non-empty `/`-delimited path tokens, percent-decoded.
    pub path_segments: Vec<String>,
    /// Whether the raw path ended in `/` (root excluded).
    pub trailing_slash: bool,
    pub query_params: BTreeMap<String, String>,
    pub is_secure: bool,
}

impl RequestDescriptor {
    /// Build a descriptor from a host, raw path and raw query string.
    pub fn new(host: &str, path: &str, query: Option<&str>, is_secure: bool) -> Self {
        let host = host.to_ascii_lowercase();

        let path_segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                urlencoding::decode(s)
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            })
            .collect();

        let trailing_slash = !path_segments.is_empty() && path.ends_with('/');

        let query_params = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host,
            path_segments,
            trailing_slash,
            query_params,
            is_secure,
        }
    }

    /// Parse an absolute URL (`http://host/path?query`).
    pub fn from_url(raw: &str) -> Result<Self, url::ParseError> {
        let parsed = url::Url::parse(raw)?;
        let host = parsed.host_str().ok_or(url::ParseError::EmptyHost)?;
        let host = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Self::new(
            &host,
            parsed.path(),
            parsed.query(),
            parsed.scheme() == "https",
        ))
    }
}
