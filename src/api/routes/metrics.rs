//! Host metrics endpoint

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::state::ApiState;
use crate::api::types::{MetricsKind, MetricsResponse};

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    /// Max results, most recent kept (default: everything stored)
    limit: Option<usize>,

    /// Take one fresh snapshot instead of reading history
    #[serde(default)]
    current: bool,
}

/// GET /metrics
pub async fn get_metrics(
    State(state): State<ApiState>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<Json<MetricsResponse>> {
    let (metrics, kind) = if query.current {
        let snapshot = state.collector.current_metrics().await?;
        (vec![snapshot], MetricsKind::Current)
    } else {
        (
            state.collector.metrics_history(query.limit),
            MetricsKind::Historical,
        )
    };

    Ok(Json(MetricsResponse {
        count: metrics.len(),
        metrics,
        kind,
    }))
}
