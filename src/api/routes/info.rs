//! API index

use axum::Json;
use serde_json::{Value, json};

/// GET /
pub async fn api_info() -> Json<Value> {
    Json(json!({
        "name": "Log & Metrics Collector API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "REST API for system metrics and log monitoring",
        "endpoints": {
            "GET /": "API information",
            "GET /health": "Health check",
            "GET /metrics": "System metrics (params: ?limit=N, ?current=true)",
            "GET /logs": "Log entries (params: ?limit=N, ?level=ERROR|WARNING|INFO|DEBUG|UNKNOWN)",
            "GET /logs/stats": "Log statistics",
            "GET /status": "Application status",
            "GET /config": "Current configuration",
        },
        "examples": {
            "current_metrics": "/metrics?current=true",
            "last_10_metrics": "/metrics?limit=10",
            "error_logs": "/logs?level=ERROR&limit=20",
            "recent_logs": "/logs?limit=50",
        },
    }))
}
