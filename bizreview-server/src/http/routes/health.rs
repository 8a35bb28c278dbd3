//! Index and health check endpoints

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Index response pointing clients at the API
#[derive(Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
}

/// GET /
async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Please navigate to /businesses to use this API",
    })
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Index and health routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_returns_ok() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn index_points_to_businesses() {
        let Json(body) = index().await;
        assert!(body.message.contains("/businesses"));
    }
}
