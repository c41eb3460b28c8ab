//! W3C trace context propagation for calls to the order backend.

use opentelemetry::trace::TraceContextExt;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// W3C `traceparent` header.
pub const TRACEPARENT_HEADER: &str = "traceparent";
/// W3C `tracestate` header, sent only when the span carries vendor state.
pub const TRACESTATE_HEADER: &str = "tracestate";
/// Correlation id shared by the console logs and the backend call.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Write the current span's context as `traceparent`/`tracestate`.
/// Nothing is written when there is no valid span context.
pub fn inject_trace_context(headers: &mut HeaderMap) {
    let context = Span::current().context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if !span_context.is_valid() {
        return;
    }

    let traceparent = format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    );
    if let Ok(value) = traceparent.parse() {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let tracestate = span_context.trace_state().header();
    if !tracestate.is_empty() {
        if let Ok(value) = tracestate.parse() {
            headers.insert(TRACESTATE_HEADER, value);
        }
    }
}

/// Trace context plus the caller's request id, when one is known.
///
/// Ids that are not valid header values are dropped.
pub fn inject_trace_headers(headers: &mut HeaderMap, request_id: Option<&str>) {
    inject_trace_context(headers);

    if let Some(value) = request_id.and_then(|id| id.parse().ok()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
}

/// Wraps a `reqwest` builder so trace headers are added at send time,
/// after the caller has finished configuring the request.
pub struct TracedRequest {
    request: reqwest::RequestBuilder,
}

impl TracedRequest {
    /// Wrap an already started request.
    pub fn new(request: reqwest::RequestBuilder) -> Self {
        Self { request }
    }

    /// Set a header on the wrapped request.
    pub fn header(self, key: &str, value: &str) -> Self {
        Self {
            request: self.request.header(key, value),
        }
    }

    /// Serialize `json` as the request body.
    pub fn json<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        Self {
            request: self.request.json(json),
        }
    }

    /// Per-request timeout, overriding the client default.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            request: self.request.timeout(timeout),
        }
    }

    /// Send with `traceparent`/`tracestate` from the current span.
    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let mut headers = HeaderMap::new();
        inject_trace_context(&mut headers);
        self.request.headers(headers).send().await
    }

    /// Send with trace context and `x-request-id`.
    pub async fn send_with_request_id(
        self,
        request_id: Option<&str>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, request_id);
        self.request.headers(headers).send().await
    }
}

/// `reqwest::Client` shorthand for building a [`TracedRequest`].
pub trait TracedClientExt {
    /// Start a traced `POST` to `url`.
    fn traced_post(&self, url: &str) -> TracedRequest;
}

impl TracedClientExt for reqwest::Client {
    fn traced_post(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_span_means_no_trace_headers() {
        let mut headers = HeaderMap::new();
        inject_trace_context(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn request_id_is_forwarded() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some("req-42"));
        assert_eq!(headers.get(REQUEST_ID_HEADER).unwrap(), "req-42");
        assert!(headers.get(TRACEPARENT_HEADER).is_none());
    }

    #[test]
    fn unusable_request_id_is_dropped() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some("req\n42"));
        assert!(headers.get(REQUEST_ID_HEADER).is_none());
    }
}
