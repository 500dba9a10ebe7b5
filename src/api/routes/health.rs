//! Health check endpoint

use axum::{Json, extract::State};

use crate::api::state::ApiState;
use crate::api::types::{HealthComponents, HealthResponse};

/// GET /health
///
/// Always 200 while the process serves requests; the component flags tell
/// whether sampling and log monitoring are actually active.
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: HealthComponents {
            metrics_collector: state.collector.is_sampling(),
            log_monitor: state.collector.is_running(),
        },
    })
}
