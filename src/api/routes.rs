//! API Routes
//!
//! Configures the Axum router for the stock data endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clean_handler, clear_all_handler, clear_endpoint_handler, daily_handler, entries_handler,
    health_handler, intraday_handler, movers_handler, overview_handler, refresh_daily_handler,
    refresh_intraday_handler, refresh_movers_handler, refresh_overview_handler,
    refresh_search_handler, search_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        // Market data
        .route("/search", get(search_handler))
        .route("/overview/:symbol", get(overview_handler))
        .route("/movers", get(movers_handler))
        .route("/intraday/:symbol", get(intraday_handler))
        .route("/daily/:symbol", get(daily_handler))
        // Forced refresh
        .route("/refresh/search", post(refresh_search_handler))
        .route("/refresh/overview/:symbol", post(refresh_overview_handler))
        .route("/refresh/movers", post(refresh_movers_handler))
        .route("/refresh/intraday/:symbol", post(refresh_intraday_handler))
        .route("/refresh/daily/:symbol", post(refresh_daily_handler))
        // Cache maintenance
        .route("/cache", delete(clear_all_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/entries", get(entries_handler))
        .route("/cache/clean", post(clean_handler))
        .route("/cache/:endpoint", delete(clear_endpoint_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::config::Config;
    use crate::error::RemoteError;
    use crate::remote::{ApiRequest, RemoteClient};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    struct DownClient;

    #[async_trait]
    impl RemoteClient for DownClient {
        async fn invoke(&self, _request: &ApiRequest) -> Result<Value, RemoteError> {
            Err(RemoteError::Transport("unreachable".to_string()))
        }
    }

    fn create_test_app() -> Router {
        let state = AppState::with_parts(
            &Config::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(DownClient),
        );
        create_router(state)
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        create_test_app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of("GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(status_of("GET", "/cache/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_remote_failure_is_bad_gateway() {
        assert_eq!(status_of("GET", "/movers").await, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_missing_keywords_is_bad_request() {
        assert_eq!(status_of("GET", "/search").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_refresh_requires_post() {
        assert_eq!(
            status_of("GET", "/refresh/movers").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        assert_eq!(status_of("GET", "/nope").await, StatusCode::NOT_FOUND);
    }
}
