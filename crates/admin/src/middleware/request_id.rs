//! Request correlation ids.
//!
//! A proxy-supplied `x-request-id` is trusted only when it is short printable
//! ASCII; anything else is replaced so log fields and Sentry tags stay
//! bounded.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest incoming id that is reused.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Id of one request, as logged and echoed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// The incoming header if acceptable, otherwise a fresh UUID v4.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|id| Self::is_acceptable(id))
            .map_or_else(Self::generate, |id| Self(id.to_string()))
    }

    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn is_acceptable(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= MAX_REQUEST_ID_LEN
            && id.bytes().all(|b| b.is_ascii_graphic())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Attach a [`RequestId`] to the request span, the Sentry scope and the
/// response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());

    tracing::Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", request_id.as_str()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_proxy_id_is_reused() {
        let id = RequestId::from_headers(&headers("req-42"));
        assert_eq!(id.as_str(), "req-42");
    }

    #[test]
    fn test_missing_id_is_generated() {
        let id = RequestId::from_headers(&HeaderMap::new());
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_oversized_id_is_replaced() {
        let long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        let id = RequestId::from_headers(&headers(&long));
        assert!(Uuid::parse_str(id.as_str()).is_ok());

        let limit = "a".repeat(MAX_REQUEST_ID_LEN);
        assert_eq!(RequestId::from_headers(&headers(&limit)).as_str(), limit);
    }

    #[test]
    fn test_id_with_spaces_is_replaced() {
        let id = RequestId::from_headers(&headers("two words"));
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_empty_id_is_replaced() {
        let id = RequestId::from_headers(&headers(""));
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }
}
