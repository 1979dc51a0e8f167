use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Paths that serve HTML pages rather than JSON.
const PAGE_ROUTES: &[&str] = &["/"];

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let is_page_route = PAGE_ROUTES.contains(&req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_XSS_PROTECTION,
        header::HeaderValue::from_static("1; mode=block"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );

    if is_page_route {
        // The upload page uses an inline script and posts back to this origin,
        // and previews the selected file through a blob: URL.
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self' 'unsafe-inline'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data: blob:; \
                 connect-src 'self'; \
                 frame-ancestors 'none'",
            ),
        );
    } else {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware::from_fn, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "page" }))
            .route("/health", get(|| async { "ok" }))
            .layer(from_fn(security_headers_middleware))
    }

    async fn csp_for(path: &str) -> String {
        let response = app()
            .oneshot(HttpRequest::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        response
            .headers()
            .get(header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn api_routes_get_strict_policy() {
        assert_eq!(
            csp_for("/health").await,
            "default-src 'none'; frame-ancestors 'none'"
        );
    }

    #[tokio::test]
    async fn upload_page_allows_inline_script() {
        assert!(csp_for("/").await.contains("script-src 'self' 'unsafe-inline'"));
    }
}
