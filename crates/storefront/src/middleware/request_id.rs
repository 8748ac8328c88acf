//! Request ID middleware for request tracing and correlation.
//!
//! Accepts an upstream `x-request-id` when it looks sane, otherwise generates
//! a UUID v4. The id is recorded on the current span, tagged on the Sentry
//! scope, stored in request extensions and echoed in the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id that is passed through unchanged.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// The id assigned to the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Use the upstream id if it is short printable ASCII, else a fresh UUID.
fn resolve(upstream: Option<&str>) -> String {
    upstream
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_UPSTREAM_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = resolve(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok()),
    );

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_kept() {
        assert_eq!(resolve(Some("cf-abc-123")), "cf-abc-123");
    }

    #[test]
    fn test_missing_or_bad_id_replaced() {
        for bad in [None, Some(""), Some("has space"), Some("tab\there")] {
            let id = resolve(bad);
            assert!(Uuid::parse_str(&id).is_ok(), "expected uuid for {bad:?}");
        }
        let long = "x".repeat(MAX_UPSTREAM_ID_LEN + 1);
        assert_ne!(resolve(Some(&long)), long);
    }
}
