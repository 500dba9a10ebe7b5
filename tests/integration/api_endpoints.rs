//! Integration tests for API endpoints
//!
//! These tests verify that:
//! - All REST endpoints return the expected shapes
//! - Log queries honour limit and level, and reject unknown levels
//! - Metrics come from history or a fresh snapshot
//! - A dead host turns `current=true` into a 500

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use log_metrics_collector::{
    Collector,
    api::{ApiConfig, ApiState, LogsResponse, MetricsKind, MetricsResponse, spawn_api_server},
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::{TempDir, tempdir};

use crate::helpers::*;

async fn spawn_test_api(collector: Arc<Collector>) -> SocketAddr {
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(), // Random port
        enable_cors: true,
    };

    spawn_api_server(config, ApiState::new(collector))
        .await
        .unwrap()
}

/// Running collector over a directory seeded with a mixed log file
async fn running_collector() -> (TempDir, Arc<Collector>, SocketAddr) {
    let dir = tempdir().unwrap();
    append_lines(
        &dir.path().join("app.log"),
        &[
            "[INFO] started",
            "[ERROR] first failure",
            "[WARNING] slow response",
            "[INFO] request served",
            "[ERROR] second failure",
        ],
    );

    let collector = create_test_collector(dir.path());
    collector.start(IDLE_INTERVAL).await;
    collector.sample_now().await.unwrap();

    let addr = spawn_test_api(collector.clone()).await;
    (dir, collector, addr)
}

async fn get(addr: SocketAddr, path: &str) -> reqwest::Response {
    reqwest::get(format!("http://{addr}{path}")).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_api_info() {
    let (_dir, collector, addr) = running_collector().await;

    let response = get(addr, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Log & Metrics Collector API");
    assert!(body["endpoints"]["GET /logs/stats"].is_string());

    collector.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_health_reflects_components() {
    let (_dir, collector, addr) = running_collector().await;

    let body: Value = get(addr, "/health").await.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["components"]["metrics_collector"], true);
    assert_eq!(body["components"]["log_monitor"], true);

    collector.stop().await;

    let body: Value = get(addr, "/health").await.json().await.unwrap();
    assert_eq!(body["components"]["metrics_collector"], false);
    assert_eq!(body["components"]["log_monitor"], false);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_metrics_history_and_current() {
    let (_dir, collector, addr) = running_collector().await;
    collector.sample_now().await.unwrap();

    let history: MetricsResponse = get(addr, "/metrics").await.json().await.unwrap();
    assert_eq!(history.kind, MetricsKind::Historical);
    assert_eq!(history.count, history.metrics.len());
    assert!(history.count >= 2);

    let limited: MetricsResponse = get(addr, "/metrics?limit=1").await.json().await.unwrap();
    assert_eq!(limited.count, 1);
    assert_eq!(limited.metrics[0], *history.metrics.last().unwrap());

    let current: MetricsResponse = get(addr, "/metrics?current=true")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(current.kind, MetricsKind::Current);
    assert_eq!(current.count, 1);
    assert_eq!(current.metrics[0].cpu.count, 4);

    collector.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_current_metrics_unavailable() {
    let dir = tempdir().unwrap();
    let collector = Arc::new(Collector::with_probe(
        create_test_config(vec![dir.path().to_path_buf()], 10, 10),
        Arc::new(DeadProbe),
    ));
    let addr = spawn_test_api(collector).await;

    let response = get(addr, "/metrics?current=true").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("could not collect"));

    // history is simply empty
    let history: MetricsResponse = get(addr, "/metrics").await.json().await.unwrap();
    assert_eq!(history.count, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_logs_filter_and_limit() {
    let (_dir, collector, addr) = running_collector().await;

    let all: LogsResponse = get(addr, "/logs").await.json().await.unwrap();
    assert_eq!(all.count, 5);
    assert_eq!(all.filter.limit, 50);
    assert_eq!(all.filter.level, None);
    assert_eq!(all.logs[0].message, "[INFO] started");

    let errors: LogsResponse = get(addr, "/logs?level=error").await.json().await.unwrap();
    let messages: Vec<&str> = errors.logs.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["[ERROR] first failure", "[ERROR] second failure"]);

    let last_two: LogsResponse = get(addr, "/logs?limit=2").await.json().await.unwrap();
    let messages: Vec<&str> = last_two.logs.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["[INFO] request served", "[ERROR] second failure"]);

    let none: LogsResponse = get(addr, "/logs?level=DEBUG").await.json().await.unwrap();
    assert_eq!(none.count, 0);

    collector.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_logs_unknown_level_rejected() {
    let (_dir, collector, addr) = running_collector().await;

    let response = get(addr, "/logs?level=LOUD").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("LOUD"));

    collector.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_log_stats() {
    let (_dir, collector, addr) = running_collector().await;

    let body: Value = get(addr, "/logs/stats").await.json().await.unwrap();
    let stats = &body["statistics"];
    assert_eq!(stats["total_entries"], 5);
    assert_eq!(stats["error_count"], 2);
    assert_eq!(stats["warning_count"], 1);
    assert_eq!(stats["info_count"], 2);
    assert_eq!(stats["debug_count"], 0);
    assert_eq!(stats["unknown_count"], 0);
    assert!(body["timestamp"].is_string());

    collector.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_status_and_config() {
    let (_dir, collector, addr) = running_collector().await;

    let status: Value = get(addr, "/status").await.json().await.unwrap();
    assert_eq!(status["status"], "running");
    let components = &status["components"];
    assert_eq!(components["metrics_collector"]["active"], true);
    assert_eq!(components["metrics_collector"]["max_samples"], 100);
    assert_eq!(components["log_monitor"]["entries_collected"], 5);
    assert_eq!(components["log_monitor"]["max_entries"], 200);
    assert_eq!(components["log_monitor"]["tracked_files"], 1);
    assert_eq!(status["configuration"]["metrics_interval"], 10);
    assert_eq!(status["configuration"]["api_port"], 5000);

    let config: Value = get(addr, "/config").await.json().await.unwrap();
    let configuration = &config["configuration"];
    assert_eq!(configuration["metrics"]["collection_interval_seconds"], 10);
    assert_eq!(configuration["metrics"]["max_samples"], 100);
    assert_eq!(configuration["logging"]["max_entries"], 200);
    assert_eq!(configuration["api"]["host"], "0.0.0.0");

    collector.stop().await;

    let status: Value = get(addr, "/status").await.json().await.unwrap();
    assert_eq!(status["status"], "stopped");
}
