//! REST API for the collector
//!
//! Read-only HTTP views over the collector's stores, plus an on-demand
//! snapshot. Handlers never block on sampling except for `current=true`.
//!
//! ## Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Health check
//! - `GET /metrics` - Metric history (`?limit=N`) or a fresh snapshot (`?current=true`)
//! - `GET /logs` - Recent log entries (`?limit=N&level=ERROR|WARNING|INFO|DEBUG|UNKNOWN`)
//! - `GET /logs/stats` - Cumulative log counters
//! - `GET /status` - Collector status
//! - `GET /config` - Active configuration

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;
pub use types::{
    ConfigResponse, HealthResponse, LogStatsResponse, LogsResponse, MetricsKind, MetricsResponse,
};

use std::net::SocketAddr;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ApiSettings;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:5000")
    pub bind_addr: SocketAddr,

    /// Enable CORS for browser dashboards
    pub enable_cors: bool,
}

impl From<&ApiSettings> for ApiConfig {
    fn from(settings: &ApiSettings) -> Self {
        Self {
            bind_addr: SocketAddr::new(settings.host, settings.port),
            enable_cors: true,
        }
    }
}

/// All routes, without any middleware
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(routes::info::api_info))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::get_metrics))
        .route("/logs", get(routes::logs::get_logs))
        .route("/logs/stats", get(routes::logs::get_log_stats))
        .route("/status", get(routes::status::get_status))
        .route("/config", get(routes::status::get_config))
        .with_state(state)
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind_addr);

    let mut app = router(state).layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
