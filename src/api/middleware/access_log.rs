//! Access logging middleware.
//!
//! Logs method, path, status and latency for every API request. Request
//! and response bodies are never logged: they carry symptom text.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%method, path = %path, status, elapsed_ms, "API request failed");
    } else {
        tracing::info!(%method, path = %path, status, elapsed_ms, "API request");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn passes_response_through() {
        let app = Router::new()
            .route("/ping", get(|| async { (StatusCode::ACCEPTED, "pong") }))
            .layer(axum::middleware::from_fn(log_access));

        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
