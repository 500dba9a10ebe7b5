//! Log entry endpoints

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;

use crate::Severity;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::ApiState;
use crate::api::types::{LogFilter, LogStatsResponse, LogsResponse};

const DEFAULT_LOG_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    /// Max results (default: 50)
    limit: Option<usize>,

    /// Severity name, case-insensitive
    level: Option<String>,
}

/// GET /logs
///
/// Most recent entries, oldest first, optionally restricted to one severity.
pub async fn get_logs(
    State(state): State<ApiState>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<LogsResponse>> {
    let level = query
        .level
        .as_deref()
        .map(str::parse::<Severity>)
        .transpose()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);

    let logs = state.collector.recent_logs(Some(limit), level);

    Ok(Json(LogsResponse {
        count: logs.len(),
        logs,
        filter: LogFilter { level, limit },
    }))
}

/// GET /logs/stats
pub async fn get_log_stats(State(state): State<ApiState>) -> Json<LogStatsResponse> {
    Json(LogStatsResponse {
        statistics: state.collector.log_stats(),
        timestamp: Utc::now(),
    })
}
