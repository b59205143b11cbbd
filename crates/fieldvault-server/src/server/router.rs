//! Axum router construction.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/tokens/encrypt", post(handlers::encrypt_token))
        .route("/tokens/decrypt", post(handlers::decrypt_token))
        .route("/tokens/inspect", post(handlers::inspect_token))
        .route(
            "/records/:kind",
            post(handlers::create_record).get(handlers::list_records),
        )
        .route(
            "/records/:kind/:key",
            put(handlers::replace_record).get(handlers::get_record),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(middleware::BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = build(AppState::default());
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_reports_registered_kinds() {
        let app = build(AppState::default());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: common::protocol::HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "ok");
        assert_eq!(body.registered_kinds, 6);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build(AppState::default());
        let value = "x".repeat(middleware::BODY_LIMIT + 1);
        let body = serde_json::json!({ "value": value }).to_string();
        let req = Request::builder()
            .method("POST")
            .uri("/tokens/encrypt")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 413);
    }
}
