//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Extract routing-relevant information (host, path, query, scheme)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - `Host` header wins over the URI authority; `X-Forwarded-Proto` marks TLS

use axum::body::Body;
use axum::http::{header, HeaderName, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::RequestDescriptor;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Request ID of `request`, or `"unknown"`.
pub fn request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Build the resolver's view of an HTTP request.
pub fn describe(request: &Request<Body>) -> RequestDescriptor {
    let uri = request.uri();
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or_default();

    let forwarded_https = request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));
    let is_secure = forwarded_https || uri.scheme_str() == Some("https");

    RequestDescriptor::new(host, uri.path(), uri.query(), is_secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_host_path_and_scheme() {
        let req = Request::builder()
            .uri("/blog/post/?page=2")
            .header("Host", "WWW.Example.com:8080")
            .header("X-Forwarded-Proto", "https")
            .body(Body::empty())
            .unwrap();

        let d = describe(&req);
        assert_eq!(d.host, "www.example.com:8080");
        assert_eq!(d.path_segments, vec!["blog", "post"]);
        assert!(d.trailing_slash);
        assert_eq!(d.query_params["page"], "2");
        assert!(d.is_secure);
    }

    #[test]
    fn falls_back_to_uri_authority() {
        let req = Request::builder()
            .uri("http://example.org/")
            .body(Body::empty())
            .unwrap();
        let d = describe(&req);
        assert_eq!(d.host, "example.org");
        assert!(!d.is_secure);
        assert_eq!(request_id(&req), "unknown");
    }

    #[test]
    fn generates_uuid_ids() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let id = MakeRequestUuidV4.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
