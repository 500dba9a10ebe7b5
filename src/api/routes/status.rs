//! Collector status and configuration endpoints

use axum::{Json, extract::State};
use chrono::Utc;

use crate::api::state::ApiState;
use crate::api::types::ConfigResponse;
use crate::collector::CollectorStatus;

/// GET /status
pub async fn get_status(State(state): State<ApiState>) -> Json<CollectorStatus> {
    Json(state.collector.status())
}

/// GET /config
pub async fn get_config(State(state): State<ApiState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        configuration: state.collector.config().clone(),
        timestamp: Utc::now(),
    })
}
