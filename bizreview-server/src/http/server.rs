//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing and request-timeout middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, StatusCode, Uri};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::links::BaseUrl;
use super::routes;
use crate::db::repos::{BusinessRepo, MemoryStore, PgBusinessRepo, PgReviewRepo, ReviewRepo};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:8080)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,

    /// Public base URL for links; derived from each request when unset
    pub public_url: Option<String>,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_permissive: false,
            public_url: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub businesses: Arc<dyn BusinessRepo>,
    pub reviews: Arc<dyn ReviewRepo>,
    /// Overrides the request-derived base URL for links
    pub public_url: Option<BaseUrl>,
}

impl AppState {
    pub fn new(businesses: Arc<dyn BusinessRepo>, reviews: Arc<dyn ReviewRepo>) -> Self {
        Self {
            businesses,
            reviews,
            public_url: None,
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgBusinessRepo::new(pool.clone())),
            Arc::new(PgReviewRepo::new(pool)),
        )
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// State backed by an existing in-memory store
    pub fn with_store(store: MemoryStore) -> Self {
        Self::new(Arc::new(store.clone()), Arc::new(store))
    }

    pub fn with_public_url(mut self, url: Option<&str>) -> Self {
        self.public_url = url.map(BaseUrl::new);
        self
    }
}

/// Build the application router.
///
/// `config.public_url`, when set, replaces any base URL already on the state.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let state = match config.public_url.as_deref() {
        Some(url) => state.with_public_url(Some(url)),
        None => state,
    };
    if let Some(url) = &state.public_url {
        tracing::info!(public_url = %url, "links use configured public URL");
    }

    let routes = Router::new()
        .merge(routes::health::router())
        .merge(routes::businesses::router())
        .merge(routes::reviews::router())
        .fallback(no_route)
        .method_not_allowed_fallback(method_not_allowed);

    with_middleware(routes, config).with_state(Arc::new(state))
}

/// Tracing, timeout and CORS, outermost first.
fn with_middleware(router: Router<Arc<AppState>>, config: &ServerConfig) -> Router<Arc<AppState>> {
    // CORS configuration
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://localhost:8080"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://127.0.0.1:8080"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(map_response(timeout_as_json))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(cors);

    router.layer(middleware)
}

async fn no_route(uri: Uri) -> ApiError {
    ApiError::NoRoute {
        path: uri.path().to_owned(),
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// The timeout layer answers with an empty body; give it the JSON error shape.
async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiError::Timeout.into_response()
    } else {
        response
    }
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// run_server(AppState::postgres(pool), ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state, &config);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::routing::get;
    use tower::ServiceExt;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.cors_permissive);
        assert!(config.public_url.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn public_url_is_normalised() {
        let state = AppState::in_memory().with_public_url(Some("https://reviews.example/"));
        assert_eq!(
            state.public_url.map(|u| u.as_str().to_owned()).as_deref(),
            Some("https://reviews.example")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_times_out_with_json_body() {
        let config = ServerConfig {
            request_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let slow = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "done"
            }),
        );
        let app = with_middleware(slow, &config).with_state(Arc::new(AppState::in_memory()));

        let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "timeout");
    }
}
