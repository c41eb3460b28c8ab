use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Hardening headers. Printable documents and console pages need inline
/// styles; JSON routes get a deny-all policy.
pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let is_api_route = req.uri().path().starts_with("/api/");

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );

    if is_api_route {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
    } else {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data:; \
                 frame-ancestors 'none'",
            ),
        );
    }

    response
}
